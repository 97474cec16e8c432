use std::time::Duration;

use robot_rmi::{
    drivers::{ArmDriver, ArmDriverConfig},
    ArmError, Position,
};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ArmError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // usage: example [config.json]
    let driver_settings = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| ArmError::InvalidConfig(format!("{}: {}", path, e)))?;
            ArmDriverConfig::from_json(&json)?
        }
        None => ArmDriverConfig::new("myRobot", "192.168.58.2", 8080),
    };

    println!("going to connect");
    let driver = match ArmDriver::connect(driver_settings.clone()).await {
        Ok(driver) => {
            println!("initializing done");
            driver
        }
        Err(e) => {
            println!("Failed to connect to {:?} : {}", driver_settings, e);
            return Err(e);
        }
    };

    let angles = driver.get_joints_angles().await?;
    println!("current joints angles are: {}", angles);

    let pose = driver.get_arm_position().await?;
    println!("current arm poses are: {}", pose);

    driver
        .move_angles_relative(Position::new([-10.0, 10.0, 0.0, 0.0, 0.0, 0.0]))
        .await?;
    sleep(Duration::from_secs(1)).await;

    let angles = driver.get_joints_angles().await?;
    println!("joints angles after move: {}", angles);

    Ok(())
}
