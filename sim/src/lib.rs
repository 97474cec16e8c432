// Library exports for the arm controller simulator

pub mod robot_config;
pub mod kinematics;
pub mod server;

pub use robot_config::{DhLink, RobotConfig};
pub use kinematics::ArmKinematics;
pub use server::{serve, RobotState};
