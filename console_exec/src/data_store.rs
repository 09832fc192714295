//! # Data Store
//!
//! The console's session state. One instance is owned by the [`Console`](crate::console::Console)
//! and each component is handed the parts it updates.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use comms_if::{tc::VehicleMode, tm::MotionState};
use log::{info, warn};
use serde::Serialize;

use crate::{
    drive::DriveLimits,
    loc::Position,
    route_session::{Destination, Route},
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Status of the vehicle's position fix as seen by the console.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FixStatus {
    /// The vehicle reports the no fix sentinel.
    Searching,

    /// The last poll returned a real position.
    Locked,

    /// The last poll failed.
    ConnectionError,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The single line of text shown to the operator.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Global data store for the console.
#[derive(Debug, Clone, Serialize)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Mode
    /// The committed operating mode
    pub mode: VehicleMode,

    /// The mode the vehicle last reported for itself
    pub reported_mode: Option<VehicleMode>,

    // Telemetry
    /// Last known vehicle position, never the sentinel
    pub vehicle_pos: Option<Position>,

    pub fix_status: FixStatus,

    /// Motion state reported by the vehicle
    pub motion_state: MotionState,

    /// Motion state derived from the operator's current drive demand
    pub cmd_motion_state: MotionState,

    // Route session
    pub destination: Option<Destination>,
    pub route: Option<Route>,
    pub travel_active: bool,

    // Drive limits
    pub limits: DriveLimits,

    // Operator feedback
    pub status: StatusLine,

    // Monitoring counters
    /// Number of consecutive failed location polls
    pub num_consec_poll_errors: u64,
}

/// Summary of the pinned trip shown next to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TripInfo {
    /// Units: meters
    pub straight_line_m: Option<f64>,

    /// Units: meters
    pub route_distance_m: Option<f64>,

    /// Units: seconds
    pub route_duration_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(limits: DriveLimits) -> Self {
        Self {
            num_cycles: 0,
            mode: VehicleMode::Autonomous,
            reported_mode: None,
            vehicle_pos: None,
            fix_status: FixStatus::Searching,
            motion_state: MotionState::Stopped,
            cmd_motion_state: MotionState::Stopped,
            destination: None,
            route: None,
            travel_active: false,
            limits,
            status: StatusLine {
                text: FixStatus::Searching.status_text().into(),
                is_error: false,
            },
            num_consec_poll_errors: 0,
        }
    }

    /// Set an informational status.
    pub fn set_status<S: Into<String>>(&mut self, text: S) {
        self.status = StatusLine {
            text: text.into(),
            is_error: false,
        };
        info!("Status: {}", self.status.text);
    }

    /// Set an error status.
    pub fn set_error<S: Into<String>>(&mut self, text: S) {
        self.status = StatusLine {
            text: text.into(),
            is_error: true,
        };
        warn!("Status: {}", self.status.text);
    }

    /// True once the vehicle has reported at least one real position.
    pub fn has_fix(&self) -> bool {
        self.vehicle_pos.is_some()
    }

    /// The current route, only if it was computed against the pinned destination.
    pub fn valid_route(&self) -> Option<&Route> {
        match (&self.route, &self.destination) {
            (Some(r), Some(d)) if r.destination_id == d.id && !r.points.is_empty() => Some(r),
            _ => None,
        }
    }

    /// Information about the trip to the pinned destination, if one is pinned.
    pub fn trip_info(&self) -> Option<TripInfo> {
        let dest = self.destination.as_ref()?;
        let route = self.valid_route();

        Some(TripInfo {
            straight_line_m: self
                .vehicle_pos
                .as_ref()
                .map(|p| p.distance_to_m(&dest.position)),
            route_distance_m: route.map(|r| r.distance_m),
            route_duration_s: route.and_then(|r| r.duration_s),
        })
    }
}

impl FixStatus {
    /// Label shown on the status board.
    pub fn label(&self) -> &'static str {
        match self {
            FixStatus::Searching => "SEARCHING",
            FixStatus::Locked => "LOCKED",
            FixStatus::ConnectionError => "CONNECTION_ERROR",
        }
    }

    /// The operator status text this fix status produces.
    pub fn status_text(&self) -> &'static str {
        match self {
            FixStatus::Searching => "Waiting for GPS lock...",
            FixStatus::Locked => "GPS Fix Acquired. Pin a destination.",
            FixStatus::ConnectionError => "Connection lost to GPS server",
        }
    }
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TripInfo {
    pub fn route_distance_label(&self) -> Option<String> {
        self.route_distance_m.map(format_km)
    }

    pub fn straight_line_label(&self) -> Option<String> {
        self.straight_line_m.map(format_km)
    }

    /// Duration in whole minutes, rounded up so a short trip never reads `0 min`.
    pub fn duration_label(&self) -> Option<String> {
        self.route_duration_s
            .map(|s| format!("{} min", (s / 60.0).ceil().max(1.0) as u64))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a distance given in meters as kilometers with two decimals.
pub fn format_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_trip() -> DataStore {
        let mut ds = DataStore::new(DriveLimits::default());
        ds.vehicle_pos = Some(Position::new(12.90, 77.60));
        ds.destination = Some(Destination {
            id: 1,
            position: Position::new(12.95, 77.65),
        });
        ds
    }

    #[test]
    fn test_initial_state() {
        let ds = DataStore::new(DriveLimits::default());
        assert_eq!(ds.mode, VehicleMode::Autonomous);
        assert_eq!(ds.fix_status, FixStatus::Searching);
        assert_eq!(ds.status.text, "Waiting for GPS lock...");
        assert!(!ds.travel_active);
        assert!(ds.trip_info().is_none());
    }

    #[test]
    fn test_route_for_other_destination_is_invalid() {
        let mut ds = store_with_trip();
        ds.route = Some(Route {
            destination_id: 0,
            points: vec![Position::new(12.90, 77.60), Position::new(12.95, 77.65)],
            distance_m: 6500.0,
            duration_s: None,
        });
        assert!(ds.valid_route().is_none());

        ds.route.as_mut().unwrap().destination_id = 1;
        assert!(ds.valid_route().is_some());
    }

    #[test]
    fn test_trip_labels() {
        let mut ds = store_with_trip();
        ds.route = Some(Route {
            destination_id: 1,
            points: vec![Position::new(12.90, 77.60), Position::new(12.95, 77.65)],
            distance_m: 6500.0,
            duration_s: Some(610.0),
        });

        let info = ds.trip_info().unwrap();
        assert_eq!(info.route_distance_label().unwrap(), "6.50 km");
        assert_eq!(info.duration_label().unwrap(), "11 min");
        assert_eq!(info.straight_line_label().unwrap(), "7.76 km");
    }

    #[test]
    fn test_status_error_flag() {
        let mut ds = DataStore::new(DriveLimits::default());
        ds.set_error("busy");
        assert!(ds.status.is_error);
        ds.set_status("ok");
        assert!(!ds.status.is_error);
    }
}
