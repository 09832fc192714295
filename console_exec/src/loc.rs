//! # Location module
//!
//! Geographic positions of the vehicle and of the operator's pins.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{tc::LatLng, tm::LocationReport};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean radius of the Earth.
///
/// Units: meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position on the Earth.
///
/// The position `(0, 0)` is the "no fix" sentinel reported by the vehicle
/// before its receiver has locked, and is never a real location.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Units: degrees
    pub latitude: f64,

    /// Units: degrees
    pub longitude: f64,

    /// Ground speed, if known.
    pub speed: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed: None,
        }
    }

    /// True unless this is the `(0, 0)` sentinel.
    pub fn is_fix(&self) -> bool {
        is_fix(self)
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    /// Great circle distance to another position using the haversine formula.
    ///
    /// Units: meters
    pub fn distance_to_m(&self, other: &Position) -> f64 {
        let phi_0 = self.latitude.to_radians();
        let phi_1 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi_0.cos() * phi_1.cos() * (d_lambda / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl From<LocationReport> for Position {
    fn from(r: LocationReport) -> Self {
        Self {
            latitude: r.lat,
            longitude: r.lng,
            speed: r.speed,
        }
    }
}

impl From<LatLng> for Position {
    fn from(p: LatLng) -> Self {
        Self::new(p.lat, p.lng)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// A position is a fix unless both latitude and longitude are exactly zero.
pub fn is_fix(position: &Position) -> bool {
    !(position.latitude == 0.0 && position.longitude == 0.0)
}
