use std::error::Error;
use std::sync::Arc;

use robot_rmi::packets::{extract_frames, Frame, GET_JOINT_ANGLES, GET_TCP_POSE, MOVE_SUCCESS};
use robot_rmi::Position;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::kinematics::ArmKinematics;

/// Reply to anything the simulator cannot execute.
pub const REJECTED: &str = "-1";

// Simulated robot state
#[derive(Clone, Debug, Default)]
pub struct RobotState {
    pub joint_angles: [f64; 6],
    pub kinematics: ArmKinematics,
}

impl RobotState {
    pub fn new(kinematics: ArmKinematics) -> Self {
        Self {
            joint_angles: [0.0; 6],
            kinematics,
        }
    }

    /// Executes one controller instruction and returns the reply payload.
    pub fn execute(&mut self, instruction: &str) -> String {
        if instruction == GET_JOINT_ANGLES {
            return Position::new(self.joint_angles).to_string();
        }
        if instruction == GET_TCP_POSE {
            let pose = self.kinematics.forward_kinematics(&self.joint_angles);
            return Position::new(pose).to_string();
        }
        if let Some(args) = call_args(instruction, "GetForwardKin") {
            return match Position::parse(args) {
                Ok(joints) => Position::new(self.kinematics.forward_kinematics(&joints.values)).to_string(),
                Err(_) => REJECTED.to_string(),
            };
        }
        if let Some(args) = call_args(instruction, "MoveJ") {
            // first six arguments are the target joints
            let joints: Vec<&str> = args.split(',').take(6).collect();
            let target = match Position::parse(&joints.join(",")) {
                Ok(target) => target,
                Err(_) => return REJECTED.to_string(),
            };
            if !self.kinematics.within_limits(&target.values) {
                return REJECTED.to_string();
            }
            self.joint_angles = target.values;
            return MOVE_SUCCESS.to_string();
        }
        REJECTED.to_string()
    }
}

/// `Name(a,b,c)` -> `a,b,c`
fn call_args<'a>(instruction: &'a str, name: &str) -> Option<&'a str> {
    instruction
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

async fn handle_client(
    mut socket: TcpStream,
    robot_state: Arc<Mutex<RobotState>>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut buffer = vec![0; 1024];
    let mut temp_buffer = Vec::new();

    loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }

        temp_buffer.extend_from_slice(&buffer[..n]);

        for raw in extract_frames(&mut temp_buffer) {
            let request = match raw.and_then(|raw| Frame::parse(&raw)) {
                Ok(request) => request,
                Err(e) => {
                    warn!("dropping client after bad frame: {}", e);
                    return Err(Box::new(e));
                }
            };
            debug!("request: {}", request);

            let reply = robot_state.lock().await.execute(&request.message);
            let response = Frame::new(request.id, request.kind, reply);
            debug!("response: {}", response);
            socket.write_all(response.encode().as_bytes()).await?;
        }
    }

    Ok(())
}

/// Accepts clients forever; all of them drive the same simulated arm.
pub async fn serve(listener: TcpListener, robot_state: Arc<Mutex<RobotState>>) {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("client connected from {}", addr);

        let robot_state_clone = Arc::clone(&robot_state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, robot_state_clone).await {
                warn!("Error handling client {}: {:?}", addr, e);
            }
        });
    }
}
