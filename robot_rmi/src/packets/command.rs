use serde::{Deserialize, Serialize};

use super::{CommandKind, Frame};
use crate::{ArmPosition, JointsAngle};

pub const GET_JOINT_ANGLES: &str = "GetActualJointPosDegree()";
pub const GET_TCP_POSE: &str = "GetActualTCPPose()";

/// Reply the controller sends when it accepted a move.
pub const MOVE_SUCCESS: &str = "1";

pub const SPEED_RANGE: (f64, f64) = (0.0, 100.0);
pub const ACCELERATION_RANGE: (f64, f64) = (0.0, 100.0);
pub const BLEND_TIME_RANGE: (f64, f64) = (0.0, 500.0);

/// Scalar parameters of a joint move.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Percentage of maximum joint speed, 0-100.
    pub speed: f64,
    /// Percentage of maximum acceleration, 0-100.
    pub acceleration: f64,
    /// Smoothing into the next move, 0-500 ms.
    pub blend_time_ms: f64,
}

impl MotionParams {
    /// Values outside their range are clamped to the nearest bound.
    pub fn new(speed: f64, acceleration: f64, blend_time_ms: f64) -> Self {
        Self {
            speed: clamp(speed, SPEED_RANGE),
            acceleration: clamp(acceleration, ACCELERATION_RANGE),
            blend_time_ms: clamp(blend_time_ms, BLEND_TIME_RANGE),
        }
    }

    pub fn clamped(self) -> Self {
        Self::new(self.speed, self.acceleration, self.blend_time_ms)
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed: 100.0,
            acceleration: 100.0,
            blend_time_ms: 0.0,
        }
    }
}

pub(crate) fn clamp(value: f64, (low, high): (f64, f64)) -> f64 {
    if value.is_nan() {
        return low;
    }
    value.clamp(low, high)
}

/// Joint move to `angles`, with `pose` the matching end-effector pose.
///
/// The controller's MoveJ takes a fixed argument list: tool and user frame
/// (both 0 here), speed, acceleration, override (100), four external-axis
/// values, blend time, then the offset flag and six offset values.
pub fn new_move_j(id: u32, angles: &JointsAngle, pose: &ArmPosition, params: &MotionParams) -> Frame {
    let message = format!(
        "MoveJ({},{},0,0,{:.6},{:.6},100,0.000,0.000,0.000,0.000,{:.6},0,0,0,0,0,0,0)",
        angles.position(),
        pose.position(),
        params.speed,
        params.acceleration,
        params.blend_time_ms,
    );
    Frame::new(id.into(), CommandKind::MoveJ.code(), message)
}

pub fn new_query_angles(id: u32) -> Frame {
    Frame::new(id.into(), CommandKind::Query.code(), GET_JOINT_ANGLES)
}

pub fn new_query_poses(id: u32) -> Frame {
    Frame::new(id.into(), CommandKind::Query.code(), GET_TCP_POSE)
}

/// Asks the controller for the pose that `angles` would put the arm in.
pub fn new_query_forward_kin(id: u32, angles: &JointsAngle) -> Frame {
    let message = format!("GetForwardKin({})", angles.position());
    Frame::new(id.into(), CommandKind::Query.code(), message)
}
