use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{sleep, timeout};
use tracing::Level;

pub use crate::packets::*;
pub use crate::{ArmError, ArmPosition, JointsAngle, Position};

use super::requests::{lock, Registration, SharedRequests};
use super::{ArmDriverConfig, ConnectionState};

/// Connection engine for one arm controller.
///
/// Cloning is cheap; every clone talks over the same connection and
/// shares the same in-flight request table.
#[derive(Debug, Clone)]
pub struct ArmDriver {
    pub config: ArmDriverConfig,
    /// Diagnostic sink. Subscribe to receive every log line; with no
    /// subscribers the lines are discarded.
    pub log_channel: broadcast::Sender<String>,
    motion: MotionParams,
    arm_write: Arc<Mutex<Option<OwnedWriteHalf>>>,
    requests: SharedRequests,
    state: Arc<Mutex<ConnectionState>>,
}

impl ArmDriver {
    /// Connects to the controller and starts the background read loop.
    ///
    /// Once the link is up a joint-angle query is issued as a liveness
    /// probe; the driver is only returned if that query succeeds. From
    /// then on the read loop reconnects on its own whenever the link
    /// drops, retrying every `reconnect_interval_ms` for as long as the
    /// process lives.
    ///
    /// # Errors
    ///
    /// * [`ArmError::InvalidConfig`] if the config does not validate.
    /// * [`ArmError::Connect`] if the TCP dial fails.
    /// * Any error of [`get_joints_angles`](Self::get_joints_angles) from the probe.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = ArmDriverConfig::new("arm-1", "192.168.58.2", 8080);
    /// let driver = ArmDriver::connect(config).await?;
    /// println!("{}", driver.get_joints_angles().await?);
    /// ```
    pub async fn connect(config: ArmDriverConfig) -> Result<ArmDriver, ArmError> {
        let (log_channel, _rx) = broadcast::channel(100);
        Self::connect_with_logs(config, log_channel).await
    }

    /// Same as [`connect`](Self::connect), but diagnostics go to the given
    /// sink from the first connect attempt on.
    pub async fn connect_with_logs(
        config: ArmDriverConfig,
        log_channel: broadcast::Sender<String>,
    ) -> Result<ArmDriver, ArmError> {
        let config = config.clamped();
        config.validate()?;

        let driver = Self {
            motion: config.motion_params(),
            config,
            log_channel,
            arm_write: Arc::new(Mutex::new(None)),
            requests: SharedRequests::default(),
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
        };

        let read_half = driver.open_connection().await?;

        let watcher = driver.clone();
        let handle = tokio::spawn(async move { watcher.keep_watch(read_half).await });

        if let Err(e) = driver.get_joints_angles().await {
            handle.abort();
            driver.log(Level::WARN, format!("liveness probe failed: {}", e));
            return Err(e);
        }

        Ok(driver)
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<String> {
        self.log_channel.subscribe()
    }

    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    /// Number of requests still waiting for a response.
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }

    fn log<T: Into<String>>(&self, level: Level, message: T) {
        let message = format!("[{}] {}", self.config.name, message.into());
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            _ => tracing::debug!("{}", message),
        }
        #[cfg(feature = "logging")]
        println!("{}", message);
        let _ = self.log_channel.send(message);
    }

    async fn set_state(&self, state: ConnectionState) {
        *self.state.lock().await = state;
    }

    /// Dials the controller, installs the write half and hands back the
    /// read half.
    async fn open_connection(&self) -> Result<OwnedReadHalf, ArmError> {
        let addr = self.config.connection_url();
        self.set_state(ConnectionState::Connecting).await;
        self.log(Level::DEBUG, format!("connecting to {}", addr));

        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(ConnectionState::Disconnected).await;
                return Err(ArmError::Connect {
                    addr,
                    reason: e.to_string(),
                });
            }
        };
        let _ = stream.set_nodelay(true);

        let (read_half, write_half) = stream.into_split();
        *self.arm_write.lock().await = Some(write_half);
        self.set_state(ConnectionState::Connected).await;
        self.log(Level::INFO, format!("connected to {}", addr));
        Ok(read_half)
    }

    /// Read loop supervisor: watch until the link fails, tear it down,
    /// reconnect, repeat.
    async fn keep_watch(self, mut read_half: OwnedReadHalf) {
        loop {
            self.log(Level::DEBUG, "start keep watch...");
            let err = self.watch(&mut read_half).await;
            self.log(Level::WARN, format!("watch error: {}", err));
            self.drop_connection().await;
            read_half = self.reconnect().await;
        }
    }

    async fn drop_connection(&self) {
        self.set_state(ConnectionState::Disconnected).await;
        let write_half = self.arm_write.lock().await.take();
        if let Some(mut write_half) = write_half {
            let _ = write_half.shutdown().await;
        }
        if self.config.fail_pending_on_disconnect {
            let failed = lock(&self.requests).fail_all(&ArmError::Disconnected);
            if failed > 0 {
                self.log(Level::WARN, format!("failed {} pending requests on disconnect", failed));
            }
        }
    }

    async fn reconnect(&self) -> OwnedReadHalf {
        loop {
            match self.open_connection().await {
                Ok(read_half) => return read_half,
                Err(e) => {
                    self.log(Level::WARN, format!("reconnect error: {}", e));
                    sleep(self.config.reconnect_interval()).await;
                }
            }
        }
    }

    /// Reads and dispatches frames until the first read or decode failure,
    /// which is returned.
    async fn watch(&self, read_half: &mut OwnedReadHalf) -> ArmError {
        let mut buf = vec![0; 4096];
        let mut pending_bytes = Vec::new();

        loop {
            let n = match read_half.read(&mut buf).await {
                Ok(0) => return ArmError::Disconnected,
                Ok(n) => n,
                Err(e) => {
                    self.log(Level::DEBUG, format!("read error: {}", e));
                    return ArmError::Disconnected;
                }
            };

            pending_bytes.extend_from_slice(&buf[..n]);
            for raw in extract_frames(&mut pending_bytes) {
                let response = match raw.and_then(|raw| Response::parse(&raw)) {
                    Ok(response) => response,
                    Err(e) => return e,
                };
                self.dispatch(response).await;
            }

            if pending_bytes.len() > self.config.max_frame_len {
                return ArmError::MalformedFrame(format!(
                    "{} bytes received without a frame end",
                    pending_bytes.len()
                ));
            }
        }
    }

    async fn dispatch(&self, response: Response) {
        self.log(Level::DEBUG, format!("received: {}", response));
        let id = response.id;
        let delivered = match u32::try_from(id) {
            Ok(id) => lock(&self.requests).deliver(id, response.message),
            Err(_) => false,
        };
        if !delivered {
            self.log(Level::WARN, format!("dropping response {}: no request is waiting for it", id));
        }
    }

    async fn send_frame(&self, frame: &str) -> Result<(), ArmError> {
        let mut guard = self.arm_write.lock().await;
        let stream = guard.as_mut().ok_or(ArmError::Disconnected)?;
        if let Err(e) = stream.write_all(frame.as_bytes()).await {
            let err = ArmError::FailedToSend(e.to_string());
            self.log(Level::DEBUG, format!("send command {} error: {}", frame, e));
            return Err(err);
        }
        Ok(())
    }

    /// Sends one command and waits for the response carrying its id.
    ///
    /// `build` receives the id allocated for this request. The response
    /// message is returned as-is.
    ///
    /// # Errors
    ///
    /// * [`ArmError::RequestTimeout`] when nothing arrives within the
    ///   configured timeout; the registration is removed so a late
    ///   response is dropped. Dropping the returned future early removes
    ///   it as well.
    /// * [`ArmError::Disconnected`] / [`ArmError::FailedToSend`] when the
    ///   command could not be written.
    pub async fn request<F>(&self, build: F) -> Result<String, ArmError>
    where
        F: FnOnce(u32) -> Command,
    {
        let (registration, mut rx) = Registration::new(&self.requests)?;
        let id = registration.id();
        let command = build(id);
        let encoded = command.encode();

        self.send_frame(&encoded).await?;
        self.log(Level::DEBUG, format!("send request: {}", encoded));

        match timeout(self.config.timeout(), &mut rx).await {
            Ok(Ok(result)) => {
                registration.completed();
                if let Ok(ref message) = result {
                    self.log(Level::DEBUG, format!("request: {}, response: {}", encoded, message));
                }
                result
            }
            Ok(Err(_)) => Err(ArmError::Disconnected),
            Err(_) => {
                if !registration.release() {
                    // The read loop took the registration just as the timer fired.
                    if let Ok(result) = rx.try_recv() {
                        return result;
                    }
                }
                self.log(Level::WARN, format!("timeout when request: {}", encoded));
                Err(ArmError::RequestTimeout {
                    id,
                    timeout_ms: self.config.timeout_ms,
                })
            }
        }
    }

    pub async fn get_joints_angles(&self) -> Result<JointsAngle, ArmError> {
        let res = self.request(new_query_angles).await?;
        JointsAngle::parse(&res)
    }

    pub async fn get_arm_position(&self) -> Result<ArmPosition, ArmError> {
        let res = self.request(new_query_poses).await?;
        ArmPosition::parse(&res)
    }

    /// Asks the controller which pose `angles` corresponds to.
    pub async fn forward_kinematics(&self, angles: &JointsAngle) -> Result<ArmPosition, ArmError> {
        let res = self.request(|id| new_query_forward_kin(id, angles)).await?;
        ArmPosition::parse(&res)
    }

    /// Moves every joint to `target` (degrees).
    ///
    /// `target` is range-checked before anything is sent. The matching
    /// pose is fetched through forward kinematics and sent along with
    /// the angles in a single MoveJ.
    pub async fn move_angles_absolute(&self, target: Position) -> Result<(), ArmError> {
        let angles = JointsAngle(target);
        if !angles.check() {
            return Err(ArmError::InvalidPosition(angles.to_string()));
        }
        self.move_joints(&angles).await
    }

    /// Moves every joint by `delta` (degrees) from where it is now.
    pub async fn move_angles_relative(&self, delta: Position) -> Result<(), ArmError> {
        let mut angles = self.get_joints_angles().await?;
        angles.move_relative(&delta)?;
        self.move_joints(&angles).await
    }

    async fn move_joints(&self, angles: &JointsAngle) -> Result<(), ArmError> {
        let pose = self.forward_kinematics(angles).await?;
        let motion = self.motion;
        let res = self
            .request(|id| new_move_j(id, angles, &pose, &motion))
            .await?;

        if res != MOVE_SUCCESS {
            return Err(ArmError::FirmwareRejected(res));
        }
        Ok(())
    }
}
