//! Robot geometry for the simulator.
//!
//! Links follow the standard Denavit-Hartenberg convention
//! (`Rz(θ) · Tz(d) · Tx(a) · Rx(α)`), lengths in mm, angles in degrees.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DhLink {
    pub a: f64,
    pub alpha: f64,
    pub d: f64,
    /// Added to the joint angle before the link transform.
    pub theta_offset: f64,
}

impl DhLink {
    pub const fn new(a: f64, alpha: f64, d: f64) -> Self {
        Self {
            a,
            alpha,
            d,
            theta_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub model: String,
    pub links: [DhLink; 6],
    /// Symmetric joint limit the controller enforces on MoveJ, in degrees.
    pub joint_limit: f64,
}

impl RobotConfig {
    /// A 5 kg class six-axis collaborative arm.
    pub fn cobot_5() -> Self {
        Self {
            model: "cobot-5".to_string(),
            links: [
                DhLink::new(0.0, 90.0, 152.0),
                DhLink::new(-425.0, 0.0, 0.0),
                DhLink::new(-395.0, 0.0, 0.0),
                DhLink::new(0.0, 90.0, 102.0),
                DhLink::new(0.0, -90.0, 102.0),
                DhLink::new(0.0, 0.0, 100.0),
            ],
            joint_limit: 175.0,
        }
    }

    pub fn with_joint_limit(mut self, limit: f64) -> Self {
        self.joint_limit = limit;
        self
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::cobot_5()
    }
}
