use std::error::Error;
use std::sync::Arc;

use sim::{ArmKinematics, RobotConfig, RobotState};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    // usage: sim [port] [robot-config.json]
    let mut args = std::env::args().skip(1);
    let port = match args.next() {
        Some(port) => port.parse::<u16>()?,
        None => DEFAULT_PORT,
    };
    let config = match args.next() {
        Some(path) => serde_json::from_str::<RobotConfig>(&std::fs::read_to_string(path)?)?,
        None => RobotConfig::default(),
    };

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("simulating {} on port {}", config.model, port);

    let state = RobotState::new(ArmKinematics::from_config(config));
    sim::serve(listener, Arc::new(Mutex::new(state))).await;
    Ok(())
}
