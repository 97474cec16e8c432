//! Six-value vectors for joint angles and end-effector pose.
//!
//! [`Position`] carries no unit or range semantics of its own; the
//! wrappers [`JointsAngle`] and [`ArmPosition`] decide how the six values
//! are read and whether a move to them is allowed.

use std::fmt;
use std::ops::{Add, Deref, Index};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ArmError;

/// Lower bound of every joint, in degrees.
pub const ANGLE_LOW_LIMIT: f64 = -90.0;
/// Upper bound of every joint, in degrees.
pub const ANGLE_HIGH_LIMIT: f64 = 90.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub values: [f64; 6],
}

impl Position {
    pub fn new(values: [f64; 6]) -> Self {
        Self { values }
    }

    /// Element-wise sum of `self` and `delta`.
    pub fn calc_sum(&self, delta: &Position) -> Position {
        let mut values = self.values;
        for (v, d) in values.iter_mut().zip(delta.values.iter()) {
            *v += d;
        }
        Position { values }
    }

    /// Parses exactly six comma-separated floats, e.g. `"0,-10.5,0,0,90,0"`.
    ///
    /// Whitespace around a field is ignored.
    pub fn parse(text: &str) -> Result<Position, ArmError> {
        let fields: Vec<&str> = text.split(',').collect();
        if fields.len() != 6 {
            return Err(ArmError::ParsePosition(format!(
                "expected 6 fields, got {} in {:?}",
                fields.len(),
                text
            )));
        }

        let mut values = [0.0; 6];
        for (slot, field) in values.iter_mut().zip(fields) {
            *slot = field.trim().parse::<f64>().map_err(|e| {
                ArmError::ParsePosition(format!("field {:?} in {:?}: {}", field, text, e))
            })?;
        }
        Ok(Position { values })
    }
}

/// Full-precision wire rendering: `v1,v2,v3,v4,v5,v6`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.values;
        write!(f, "{},{},{},{},{},{}", a, b, c, d, e, g)
    }
}

impl FromStr for Position {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::parse(s)
    }
}

impl From<[f64; 6]> for Position {
    fn from(values: [f64; 6]) -> Self {
        Self { values }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        self.calc_sum(&rhs)
    }
}

impl Index<usize> for Position {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

/// Six revolute-joint angles in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointsAngle(pub Position);

impl JointsAngle {
    pub fn new(values: [f64; 6]) -> Self {
        Self(Position::new(values))
    }

    pub fn parse(text: &str) -> Result<Self, ArmError> {
        Position::parse(text).map(Self)
    }

    pub fn position(&self) -> &Position {
        &self.0
    }

    /// True iff every joint lies in `[ANGLE_LOW_LIMIT, ANGLE_HIGH_LIMIT]`.
    pub fn check(&self) -> bool {
        self.0
            .values
            .iter()
            .all(|v| (ANGLE_LOW_LIMIT..=ANGLE_HIGH_LIMIT).contains(v))
    }

    pub fn calc_sum(&self, delta: &Position) -> JointsAngle {
        JointsAngle(self.0.calc_sum(delta))
    }

    /// Replaces the current angles with `target` if it passes [`check`](Self::check).
    /// On failure `self` is left untouched.
    pub fn move_absolute(&mut self, target: JointsAngle) -> Result<(), ArmError> {
        if !target.check() {
            return Err(ArmError::InvalidPosition(target.to_string()));
        }
        *self = target;
        Ok(())
    }

    pub fn move_relative(&mut self, delta: &Position) -> Result<(), ArmError> {
        let target = self.calc_sum(delta);
        self.move_absolute(target)
    }
}

impl Deref for JointsAngle {
    type Target = Position;

    fn deref(&self) -> &Position {
        &self.0
    }
}

impl From<Position> for JointsAngle {
    fn from(position: Position) -> Self {
        Self(position)
    }
}

impl fmt::Display for JointsAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [j1, j2, j3, j4, j5, j6] = self.0.values;
        write!(
            f,
            "j1={:6.2} j2={:6.2} j3={:6.2} j4={:6.2} j5={:6.2} j6={:6.2}",
            j1, j2, j3, j4, j5, j6
        )
    }
}

/// End-effector pose: x, y, z, rx, ry, rz.
///
/// There is no range check here. The pose follows from the joint angles,
/// so the controller is the one that decides whether it is reachable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmPosition(pub Position);

impl ArmPosition {
    pub fn new(values: [f64; 6]) -> Self {
        Self(Position::new(values))
    }

    pub fn parse(text: &str) -> Result<Self, ArmError> {
        Position::parse(text).map(Self)
    }

    pub fn position(&self) -> &Position {
        &self.0
    }

    pub fn calc_sum(&self, delta: &Position) -> ArmPosition {
        ArmPosition(self.0.calc_sum(delta))
    }

    pub fn move_absolute(&mut self, target: ArmPosition) {
        *self = target;
    }

    pub fn move_relative(&mut self, delta: &Position) {
        let target = self.calc_sum(delta);
        self.move_absolute(target);
    }
}

impl Deref for ArmPosition {
    type Target = Position;

    fn deref(&self) -> &Position {
        &self.0
    }
}

impl From<Position> for ArmPosition {
    fn from(position: Position) -> Self {
        Self(position)
    }
}

impl fmt::Display for ArmPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z, rx, ry, rz] = self.0.values;
        write!(
            f,
            "x={:6.2} y={:6.2} z={:6.2} rx={:6.2} ry={:6.2} rz={:6.2}",
            x, y, z, rx, ry, rz
        )
    }
}
