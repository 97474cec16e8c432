//! In-process stand-in for the arm controller.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use robot_rmi::packets::{extract_frames, Command, Frame};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the controller does with one received command.
pub enum Reply {
    /// Answer with this message under the command's id and kind.
    Message(String),
    /// Answer after a pause.
    Delayed(Duration, String),
    /// Hold the answer back and send it right after the next one.
    Defer(String),
    /// Write these bytes verbatim.
    Raw(String),
    Silent,
}

pub type Handler = dyn Fn(&Command) -> Reply + Send + Sync;

pub struct MockController {
    pub port: u32,
    pub received: Arc<Mutex<Vec<Command>>>,
    pub connections: Arc<Mutex<usize>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl MockController {
    pub async fn start<F>(handler: F) -> MockController
    where
        F: Fn(&Command) -> Reply + Send + Sync + 'static,
    {
        Self::bind(0, handler).await
    }

    /// Listens on `port` (0 picks a free one).
    pub async fn bind<F>(port: u32, handler: F) -> MockController
    where
        F: Fn(&Command) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", port as u16)).await.unwrap();
        let port = listener.local_addr().unwrap().port() as u32;
        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(Mutex::new(0));
        let tasks = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let received_clone = received.clone();
        let connections_clone = connections.clone();
        let tasks_clone = tasks.clone();
        let acceptor = tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => return,
                };
                *connections_clone.lock().unwrap() += 1;
                let handler = handler.clone();
                let received = received_clone.clone();
                let session = tokio::spawn(async move {
                    let _ = serve(socket, handler, received).await;
                });
                tasks_clone.lock().unwrap().push(session);
            }
        });
        tasks.lock().unwrap().push(acceptor);

        MockController {
            port,
            received,
            connections,
            tasks,
        }
    }

    /// Closes the listener and every open connection.
    pub fn stop(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    pub fn received(&self) -> Vec<Command> {
        self.received.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.received().into_iter().map(|c| c.message).collect()
    }

    pub fn connections(&self) -> usize {
        *self.connections.lock().unwrap()
    }
}

async fn serve(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    received: Arc<Mutex<Vec<Command>>>,
) -> std::io::Result<()> {
    let mut buf = vec![0; 2048];
    let mut pending = Vec::new();
    let mut deferred: Option<String> = None;

    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        pending.extend_from_slice(&buf[..n]);

        for raw in extract_frames(&mut pending) {
            let command = raw
                .and_then(|raw| Frame::parse(&raw))
                .expect("driver sent a malformed frame");
            received.lock().unwrap().push(command.clone());

            let reply = |message: String| Frame::new(command.id, command.kind, message).encode();
            match handler(&command) {
                Reply::Message(message) => {
                    socket.write_all(reply(message).as_bytes()).await?;
                    if let Some(held) = deferred.take() {
                        socket.write_all(held.as_bytes()).await?;
                    }
                }
                Reply::Delayed(pause, message) => {
                    tokio::time::sleep(pause).await;
                    socket.write_all(reply(message).as_bytes()).await?;
                }
                Reply::Defer(message) => deferred = Some(reply(message)),
                Reply::Raw(bytes) => socket.write_all(bytes.as_bytes()).await?,
                Reply::Silent => {}
            }
        }
    }
}

/// Replies every query with fixed values and acknowledges every move.
pub fn answer(command: &Command, angles: &str, pose: &str, forward_kin: &str) -> Reply {
    let message = &command.message;
    if message == robot_rmi::packets::GET_JOINT_ANGLES {
        Reply::Message(angles.to_string())
    } else if message == robot_rmi::packets::GET_TCP_POSE {
        Reply::Message(pose.to_string())
    } else if message.starts_with("GetForwardKin(") {
        Reply::Message(forward_kin.to_string())
    } else if message.starts_with("MoveJ(") {
        Reply::Message("1".to_string())
    } else {
        Reply::Silent
    }
}

pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}
