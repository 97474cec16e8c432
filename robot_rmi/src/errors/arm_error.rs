use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ArmError {
    /// TCP dial failed.
    #[error("could not connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("payload length is {actual} but frame declares {declared}")]
    LengthMismatch { declared: i64, actual: usize },

    /// A comma-separated vector did not hold exactly six floats.
    #[error("could not parse position: {0}")]
    ParsePosition(String),

    /// At least one joint lies outside the allowed range.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("request {id} timed out after {timeout_ms} ms")]
    RequestTimeout { id: u32, timeout_ms: u64 },

    /// The controller answered a move with something other than the success marker.
    #[error("controller rejected the command: {0}")]
    FirmwareRejected(String),

    #[error("send error: {0}")]
    FailedToSend(String),

    #[error("controller appears to be disconnected")]
    Disconnected,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
