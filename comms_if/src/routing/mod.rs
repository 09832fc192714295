//! # Routing module
//!
//! Requests and responses for an OSRM compatible routing service. The service is asked for a
//! single route between two points with the full geometry as a GeoJSON `LineString`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tc::LatLng;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The `code` value of a successful routing response.
pub const CODE_OK: &str = "Ok";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Top level routing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub code: String,

    #[serde(default)]
    pub routes: Vec<RouteInfo>,

    /// Human readable reason given with a non `Ok` code.
    #[serde(default)]
    pub message: Option<String>,
}

/// One route alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub geometry: LineString,

    /// Units: meters
    pub distance: f64,

    /// Units: seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

/// A GeoJSON `LineString`. Coordinates are in `[lng, lat]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub geom_type: String,

    pub coordinates: Vec<[f64; 2]>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteResponse {
    /// The first route if the service reported success and returned at least one route.
    pub fn best_route(&self) -> Option<&RouteInfo> {
        if self.code == CODE_OK {
            self.routes.first()
        }
        else {
            None
        }
    }
}

impl LineString {
    /// The points of the line flipped into latitude/longitude order.
    pub fn lat_lngs(&self) -> Vec<LatLng> {
        self.coordinates
            .iter()
            .map(|c| LatLng { lat: c[1], lng: c[0] })
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the route request URL between two points.
///
/// `base` is the routing endpoint up to the profile, e.g.
/// `https://router.project-osrm.org/route/v1/driving`.
pub fn route_url(base: &str, origin: LatLng, destination: LatLng) -> String {
    format!(
        "{}/{},{};{},{}?overview=full&geometries=geojson",
        base.trim_end_matches('/'),
        origin.lng,
        origin.lat,
        destination.lng,
        destination.lat
    )
}
