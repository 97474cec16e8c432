//! Client-side driver for the `/f/b … /b/f` text-framed TCP control
//! protocol spoken by the arm controller.
//!
//! The crate is split the same way the protocol is:
//!
//! * [`position`]: six-value joint/pose vectors and the joint-range check.
//! * [`packets`]: the frame codec and the command constructors.
//! * [`drivers`]: the connection engine that correlates responses to
//!   requests and keeps the link alive (feature `driver`, on by default).

pub mod errors;
pub use errors::*;

pub mod position;
pub use position::{ArmPosition, JointsAngle, Position, ANGLE_HIGH_LIMIT, ANGLE_LOW_LIMIT};

pub mod packets;

pub mod drivers;

