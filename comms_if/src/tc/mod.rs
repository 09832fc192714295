//! # Vehicle command module
//!
//! Request and response bodies for the commands the console sends to the vehicle service.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A geographic coordinate as it appears on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Body of `POST /control`, a direct drive demand.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// Percentage of the configured maximum speed, in [-100, 100]. Positive is forwards.
    pub speed: f64,

    /// Normalised steering, in [-1, 1]. Negative is left.
    pub angle: f64,
}

/// Body of `POST /mode`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: VehicleMode,
}

/// Body of `POST /config`, the operator drive limits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    /// Maximum speed as a percentage of the vehicle's capability, in [0, 100].
    pub max_speed: u8,

    /// Maximum steering deflection as a percentage of the full range, in [0, 100].
    pub max_turn: u8,
}

/// Body of `POST /navigate`.
///
/// Which variant the vehicle service understands depends on its revision, see
/// `NavigateContract` in the console parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavigateRequest {
    /// Hand over the complete route geometry.
    Waypoints { waypoints: Vec<LatLng> },

    /// Hand over only the final destination.
    Destination(LatLng),
}

/// The `{ status, message? }` response of `POST /mode` and `POST /navigate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,

    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Operating modes of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleMode {
    /// Follow a route handed over by the console.
    Autonomous,

    /// Drive directly from the operator's joystick or buttons.
    Manual,

    /// Limited drive, route controls are available to the operator.
    SemiAutonomous,
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Error, PartialEq)]
#[error("{0:?} is not a recognised mode, expected AUTONOMOUS, MANUAL or SEMI_AUTONOMOUS")]
pub struct ModeParseError(pub String);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StatusResponse {
    /// True if the service reported `"success"`.
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// The reason given by the service, or a generic one if none was sent.
    pub fn reason(&self) -> String {
        match self.message {
            Some(ref m) if !m.is_empty() => m.clone(),
            _ => format!("vehicle responded with status {:?}", self.status),
        }
    }
}

impl VehicleMode {
    /// All modes, in the order they are offered to the operator.
    pub const ALL: [VehicleMode; 3] = [
        VehicleMode::Autonomous,
        VehicleMode::Manual,
        VehicleMode::SemiAutonomous,
    ];

    /// The wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleMode::Autonomous => "AUTONOMOUS",
            VehicleMode::Manual => "MANUAL",
            VehicleMode::SemiAutonomous => "SEMI_AUTONOMOUS",
        }
    }
}

impl fmt::Display for VehicleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleMode {
    type Err = ModeParseError;

    /// Parse a mode name, accepting the wire names and a few operator friendly short forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "AUTONOMOUS" | "AUTO" => Ok(VehicleMode::Autonomous),
            "MANUAL" | "MAN" => Ok(VehicleMode::Manual),
            "SEMI_AUTONOMOUS" | "SEMI" => Ok(VehicleMode::SemiAutonomous),
            _ => Err(ModeParseError(s.into())),
        }
    }
}
