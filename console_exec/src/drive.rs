//! # Drive demands
//!
//! Direct drive commands produced by the operator's joystick and buttons, and the operator
//! configured limits applied to them on the vehicle side.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fmt, str::FromStr};

use comms_if::{
    tc::{ConfigRequest, ControlRequest},
    tm::MotionState,
};
use serde::{Deserialize, Serialize};
use util::maths::{clamp, clamp_abs, lin_map};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest speed demand, as a percentage of the configured maximum.
pub const MAX_SPEED_PCT: f64 = 100.0;

/// Largest normalised steering demand.
pub const MAX_ANGLE: f64 = 1.0;

/// Speed demands below this magnitude are considered stopped.
const SPEED_THRESHOLD_PCT: f64 = 5.0;

/// Steering demands above this magnitude are considered turning.
const TURN_THRESHOLD: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A direct drive demand.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct DriveCommand {
    /// Percentage of the configured maximum speed, in [-100, 100]. Positive is forwards.
    pub speed: f64,

    /// Normalised steering, in [-1, 1]. Negative is left.
    pub angle: f64,
}

/// Operator configured scaling bounds, applied by the vehicle to every [`DriveCommand`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveLimits {
    /// Units: percent, in [0, 100]
    pub max_speed: f64,

    /// Units: percent, in [0, 100]
    pub max_turn: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The directional drive buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DriveButton {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, thiserror::Error)]
#[error("{0:?} is not a drive button, expected forward, backward, left or right")]
pub struct DriveButtonParseError(String);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCommand {
    /// Build a command, clamping both values into their valid ranges.
    pub fn new(speed: f64, angle: f64) -> Self {
        Self {
            speed: clamp_abs(speed, MAX_SPEED_PCT),
            angle: clamp_abs(angle, MAX_ANGLE),
        }
    }

    /// The stop command: zero speed and neutral steering.
    pub fn stop() -> Self {
        Self::default()
    }

    pub fn is_stop(&self) -> bool {
        self.speed == 0.0 && self.angle == 0.0
    }

    /// Map a joystick direction vector into a command.
    ///
    /// `x` is the right-left deflection and `y` the up-down deflection, both nominally in
    /// [-1, 1] with up being forwards.
    pub fn from_joystick(x: f64, y: f64) -> Self {
        Self::new(
            lin_map((-1.0, 1.0), (-MAX_SPEED_PCT, MAX_SPEED_PCT), y),
            x,
        )
    }

    /// The motion the vehicle should exhibit when executing this command.
    pub fn motion_state(&self) -> MotionState {
        if self.speed.abs() < SPEED_THRESHOLD_PCT {
            return MotionState::Stopped
        }

        let forward = self.speed > 0.0;

        if self.angle < -TURN_THRESHOLD {
            if forward { MotionState::ForwardLeft } else { MotionState::BackwardLeft }
        }
        else if self.angle > TURN_THRESHOLD {
            if forward { MotionState::ForwardRight } else { MotionState::BackwardRight }
        }
        else if forward {
            MotionState::Forward
        }
        else {
            MotionState::Backward
        }
    }
}

impl From<DriveCommand> for ControlRequest {
    fn from(c: DriveCommand) -> Self {
        ControlRequest {
            speed: c.speed,
            angle: c.angle,
        }
    }
}

impl DriveLimits {
    /// Build limits, clamping into [0, 100] and rounding to whole percent as the vehicle expects.
    pub fn new(max_speed: f64, max_turn: f64) -> Self {
        Self {
            max_speed: clamp(max_speed, 0.0, 100.0).round(),
            max_turn: clamp(max_turn, 0.0, 100.0).round(),
        }
    }
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self::new(50.0, 100.0)
    }
}

impl From<DriveLimits> for ConfigRequest {
    fn from(l: DriveLimits) -> Self {
        let l = DriveLimits::new(l.max_speed, l.max_turn);
        ConfigRequest {
            max_speed: l.max_speed as u8,
            max_turn: l.max_turn as u8,
        }
    }
}

impl fmt::Display for DriveLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "speed {:.0} %, turn {:.0} %", self.max_speed, self.max_turn)
    }
}

impl FromStr for DriveButton {
    type Err = DriveButtonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "fwd" | "f" | "up" => Ok(DriveButton::Forward),
            "backward" | "back" | "b" | "down" => Ok(DriveButton::Backward),
            "left" | "l" => Ok(DriveButton::Left),
            "right" | "r" => Ok(DriveButton::Right),
            _ => Err(DriveButtonParseError(s.into())),
        }
    }
}
