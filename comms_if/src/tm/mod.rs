//! # Vehicle telemetry module
//!
//! Responses of the vehicle service's polled endpoints.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tc::VehicleMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Response of `GET /location`.
///
/// The vehicle reports `lat == 0 && lng == 0` until its GPS receiver has a fix.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub lat: f64,
    pub lng: f64,

    /// Ground speed if the receiver provides one.
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Response of `GET /state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    pub motion_state: String,

    pub mode: String,

    #[serde(default)]
    pub max_speed: Option<f64>,

    #[serde(default)]
    pub max_turn: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Motion of the vehicle, as reported by the vehicle or derived from a drive demand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotionState {
    Stopped,
    Forward,
    Backward,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,

    /// A label this console doesn't know about.
    Unknown,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StateReport {
    /// The motion state label parsed into a [`MotionState`].
    pub fn motion_state(&self) -> MotionState {
        MotionState::from_label(&self.motion_state)
    }

    /// The vehicle's own idea of its mode, if the label is recognised.
    pub fn mode(&self) -> Option<VehicleMode> {
        self.mode.parse().ok()
    }
}

impl MotionState {
    /// Parse a motion state label, unknown labels give `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "STOPPED" => MotionState::Stopped,
            "FORWARD" => MotionState::Forward,
            "BACKWARD" => MotionState::Backward,
            "FORWARD_LEFT" => MotionState::ForwardLeft,
            "FORWARD_RIGHT" => MotionState::ForwardRight,
            "BACKWARD_LEFT" => MotionState::BackwardLeft,
            "BACKWARD_RIGHT" => MotionState::BackwardRight,
            _ => MotionState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Stopped => "STOPPED",
            MotionState::Forward => "FORWARD",
            MotionState::Backward => "BACKWARD",
            MotionState::ForwardLeft => "FORWARD_LEFT",
            MotionState::ForwardRight => "FORWARD_RIGHT",
            MotionState::BackwardLeft => "BACKWARD_LEFT",
            MotionState::BackwardRight => "BACKWARD_RIGHT",
            MotionState::Unknown => "UNKNOWN",
        }
    }
}

impl Default for MotionState {
    fn default() -> Self {
        MotionState::Stopped
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
