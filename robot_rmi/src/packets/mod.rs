mod command;
mod framing;

pub use command::*;
pub use framing::*;

use std::fmt;
use std::str::FromStr;

use int_enum::IntEnum;
use serde::{Deserialize, Serialize};

use crate::ArmError;

pub const FRAME_START: &str = "/f/b";
pub const FRAME_END: &str = "/b/f";
pub const FIELD_DELIMITER: &str = "III";

/// Exclusive upper bound of the controller's request id space.
pub const ID_SPACE: u32 = 999;

/// Operation kind carried in the second field of every frame.
#[repr(u32)]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, IntEnum)]
pub enum CommandKind {
    MoveJ = 201,
    Query = 377,
}

impl CommandKind {
    /// The value written to the kind field.
    pub fn code(self) -> i64 {
        i64::from(u32::from(self))
    }
}

/// One wire frame: `/f/bIII<id>III<kind>III<len>III<message>III/b/f`.
///
/// Requests and responses share the layout; the id is what ties a
/// response to the request that caused it. Header fields are kept as
/// signed 64-bit integers so that any integer the controller writes
/// decodes, even ids outside the space this side allocates from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: i64,
    pub kind: i64,
    pub len: i64,
    pub message: String,
}

pub type Command = Frame;
pub type Response = Frame;

impl Frame {
    /// Builds a frame whose `len` matches `message`.
    pub fn new(id: i64, kind: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            id,
            kind,
            len: message.chars().count() as i64,
            message,
        }
    }

    /// The known operation kind, if the raw value is one.
    pub fn command_kind(&self) -> Option<CommandKind> {
        u32::try_from(self.kind)
            .ok()
            .and_then(|kind| CommandKind::try_from(kind).ok())
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decodes one complete frame.
    ///
    /// # Errors
    ///
    /// * [`ArmError::MalformedFrame`] when the frame does not split into the
    ///   two markers plus four fields, the markers are wrong, or id, kind or
    ///   length are not integers.
    /// * [`ArmError::LengthMismatch`] when the payload's character count
    ///   differs from the declared length (a negative length never matches).
    pub fn parse(raw: &str) -> Result<Frame, ArmError> {
        let tokens: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
        if tokens.len() != 6 {
            return Err(ArmError::MalformedFrame(format!(
                "expected 6 tokens, got {}: {}",
                tokens.len(),
                raw
            )));
        }
        if tokens[0] != FRAME_START || tokens[5] != FRAME_END {
            return Err(ArmError::MalformedFrame(format!("bad frame markers: {}", raw)));
        }

        let id = tokens[1]
            .parse::<i64>()
            .map_err(|_| ArmError::MalformedFrame(format!("id is not valid: {}", raw)))?;
        let kind = tokens[2]
            .parse::<i64>()
            .map_err(|_| ArmError::MalformedFrame(format!("kind is not valid: {}", raw)))?;
        let len = tokens[3]
            .parse::<i64>()
            .map_err(|_| ArmError::MalformedFrame(format!("length is not valid: {}", raw)))?;

        let message = tokens[4].to_string();
        let actual = message.chars().count();
        if i64::try_from(actual).ok() != Some(len) {
            return Err(ArmError::LengthMismatch {
                declared: len,
                actual,
            });
        }

        Ok(Frame {
            id,
            kind,
            len,
            message,
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{start}{d}{}{d}{}{d}{}{d}{}{d}{end}",
            self.id,
            self.kind,
            self.len,
            self.message,
            start = FRAME_START,
            end = FRAME_END,
            d = FIELD_DELIMITER,
        )
    }
}

impl FromStr for Frame {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frame::parse(s)
    }
}
