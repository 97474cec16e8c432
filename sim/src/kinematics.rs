// Forward kinematics for the simulated arm

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::robot_config::RobotConfig;

#[derive(Debug, Clone)]
pub struct ArmKinematics {
    config: RobotConfig,
}

impl ArmKinematics {
    pub fn from_config(config: RobotConfig) -> Self {
        Self { config }
    }

    /// Flange pose for the given joint angles (degrees).
    ///
    /// Returns `[x, y, z, rx, ry, rz]`: position in mm and roll/pitch/yaw
    /// about the fixed base axes in degrees.
    pub fn forward_kinematics(&self, joints: &[f64; 6]) -> [f64; 6] {
        let flange = self
            .config
            .links
            .iter()
            .zip(joints.iter())
            .fold(Isometry3::identity(), |acc, (link, joint)| {
                let theta = (joint + link.theta_offset).to_radians();
                let along_z = Isometry3::from_parts(
                    Translation3::new(0.0, 0.0, link.d),
                    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta),
                );
                let along_x = Isometry3::from_parts(
                    Translation3::new(link.a, 0.0, 0.0),
                    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), link.alpha.to_radians()),
                );
                acc * along_z * along_x
            });

        let t = flange.translation.vector;
        let (roll, pitch, yaw) = flange.rotation.euler_angles();
        [
            t.x,
            t.y,
            t.z,
            roll.to_degrees(),
            pitch.to_degrees(),
            yaw.to_degrees(),
        ]
    }

    pub fn within_limits(&self, joints: &[f64; 6]) -> bool {
        let limit = self.config.joint_limit;
        joints.iter().all(|j| (-limit..=limit).contains(j))
    }
}

impl Default for ArmKinematics {
    fn default() -> Self {
        Self::from_config(RobotConfig::default())
    }
}
