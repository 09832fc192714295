//! # Route Session
//!
//! Owns the lifecycle of a trip: pinning a destination, computing a route to it with the routing
//! service, and handing that route to the vehicle. A route is only ever used with the destination
//! it was computed for, and replies to requests made before a newer pin or a reset are discarded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{net::TransportError, routing::CODE_OK, tc::NavigateRequest};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    data_store::{format_km, DataStore},
    loc::Position,
    outbox::{LinkReply, LinkRequest, LinkResult, Outbox, RequestId},
    params::NavigateContract,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pinned destination. Every pin gets a new id.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub id: u64,
    pub position: Position,
}

/// A route computed for one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Id of the destination this route leads to.
    pub destination_id: u64,

    pub points: Vec<Position>,

    /// Units: meters
    pub distance_m: f64,

    /// Units: seconds
    pub duration_s: Option<f64>,
}

pub struct RouteSession {
    contract: NavigateContract,

    /// Id given to the previous pin.
    last_destination_id: u64,

    /// Route request in flight and the destination it was made for.
    pending_route: Option<(RequestId, u64)>,

    /// Navigate request in flight.
    pending_nav: Option<(RequestId, u64)>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PinError {
    #[error("Please wait for your location")]
    NoFixYet,

    #[error("Cannot pin the no fix position")]
    SentinelPosition,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No route found: {0}")]
    NoRouteFound(String),

    #[error("Routing service unavailable: {0}")]
    ServiceUnavailable(TransportError),

    #[error("Please wait for your location")]
    NoFix,

    #[error("Pin a destination first")]
    NoDestination,
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("No route to the pinned destination, compute one first")]
    NoRoute,

    #[error("Travel rejected: {0}")]
    Rejected(String),

    #[error("Could not start travel: {0}")]
    ServiceUnavailable(TransportError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteSession {
    pub fn new(contract: NavigateContract) -> Self {
        Self {
            contract,
            last_destination_id: 0,
            pending_route: None,
            pending_nav: None,
        }
    }

    /// Pin a new destination, replacing any previous one and invalidating its route.
    pub fn pin(&mut self, position: Position, ds: &mut DataStore) -> Result<Destination, PinError> {
        if !ds.has_fix() {
            ds.set_error(PinError::NoFixYet.to_string());
            return Err(PinError::NoFixYet);
        }

        if !position.is_fix() {
            ds.set_error(PinError::SentinelPosition.to_string());
            return Err(PinError::SentinelPosition);
        }

        self.last_destination_id += 1;
        let dest = Destination {
            id: self.last_destination_id,
            position: Position {
                speed: None,
                ..position
            },
        };

        if let Some((id, _)) = self.pending_route.take() {
            debug!("Route request {} invalidated by new pin", id);
        }
        if ds.route.take().is_some() {
            debug!("Route invalidated by new pin");
        }
        ds.destination = Some(dest);

        info!(
            "Destination {} pinned at {:.6}, {:.6}",
            dest.id, dest.position.latitude, dest.position.longitude
        );
        ds.set_status("Destination pinned. Ready to route.");

        Ok(dest)
    }

    /// Request a route from `origin` to `destination`.
    pub fn compute_route(
        &mut self,
        origin: &Position,
        destination: &Destination,
        outbox: &mut Outbox,
    ) -> Result<RequestId, RouteError> {
        if !origin.is_fix() {
            return Err(RouteError::NoFix);
        }
        if !destination.position.is_fix() {
            return Err(RouteError::NoDestination);
        }

        let id = outbox.push(LinkRequest::Route {
            origin: origin.lat_lng(),
            destination: destination.position.lat_lng(),
        });
        self.pending_route = Some((id, destination.id));

        Ok(id)
    }

    /// Request a route from the last known vehicle position to the pinned destination.
    pub fn compute_route_from_store(
        &mut self,
        ds: &mut DataStore,
        outbox: &mut Outbox,
    ) -> Result<RequestId, RouteError> {
        let result = match (ds.vehicle_pos, ds.destination) {
            (None, _) => Err(RouteError::NoFix),
            (_, None) => Err(RouteError::NoDestination),
            (Some(origin), Some(dest)) => self.compute_route(&origin, &dest, outbox),
        };

        match result {
            Ok(_) => ds.set_status("Calculating route..."),
            Err(ref e) => ds.set_error(e.to_string()),
        }

        result
    }

    /// Apply the routing service's reply.
    ///
    /// Returns the new route, or `Ok(None)` if the reply was for a superseded request.
    pub fn on_route_response(
        &mut self,
        id: RequestId,
        result: LinkResult,
        ds: &mut DataStore,
    ) -> Result<Option<Route>, RouteError> {
        let dest_id = match self.pending_route {
            Some((pending, dest_id)) if pending == id => dest_id,
            _ => {
                debug!("Discarding stale route reply {}", id);
                return Ok(None);
            }
        };
        self.pending_route = None;

        if ds.destination.map(|d| d.id) != Some(dest_id) {
            debug!("Discarding route for old destination {}", dest_id);
            return Ok(None);
        }

        let result = match result {
            Ok(LinkReply::Route(resp)) => match resp.best_route() {
                Some(info) if !info.geometry.coordinates.is_empty() => Ok(Route {
                    destination_id: dest_id,
                    points: info.geometry.lat_lngs().into_iter().map(Position::from).collect(),
                    distance_m: info.distance,
                    duration_s: info.duration,
                }),
                Some(_) => Err(RouteError::NoRouteFound("empty route geometry".into())),
                None if resp.code != CODE_OK => Err(RouteError::NoRouteFound(
                    resp.message.clone().unwrap_or_else(|| resp.code.clone()),
                )),
                None => Err(RouteError::NoRouteFound("no routes returned".into())),
            },
            Ok(other) => Err(RouteError::NoRouteFound(format!("unexpected reply {:?}", other))),
            Err(e) => Err(RouteError::ServiceUnavailable(e)),
        };

        match result {
            Ok(route) => {
                info!(
                    "Route of {} with {} points computed",
                    format_km(route.distance_m),
                    route.points.len()
                );
                ds.route = Some(route.clone());
                ds.set_status("Route calculated! Ready to Travel.");
                Ok(Some(route))
            }
            Err(e) => {
                ds.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Hand the current route to the vehicle.
    ///
    /// Fails without sending anything unless a route to the pinned destination exists.
    pub fn start_travel(
        &mut self,
        ds: &mut DataStore,
        outbox: &mut Outbox,
    ) -> Result<RequestId, NavigationError> {
        let body = match (ds.valid_route(), ds.destination) {
            (Some(route), Some(dest)) => Some((
                match self.contract {
                    NavigateContract::Waypoints => NavigateRequest::Waypoints {
                        waypoints: route.points.iter().map(|p| p.lat_lng()).collect(),
                    },
                    NavigateContract::Destination => {
                        NavigateRequest::Destination(dest.position.lat_lng())
                    }
                },
                dest.id,
            )),
            _ => None,
        };

        let (body, dest_id) = match body {
            Some(b) => b,
            None => {
                ds.set_error(NavigationError::NoRoute.to_string());
                return Err(NavigationError::NoRoute);
            }
        };

        let id = outbox.push(LinkRequest::Navigate(body));
        self.pending_nav = Some((id, dest_id));
        ds.set_status("Starting travel...");

        Ok(id)
    }

    /// Apply the vehicle's answer to a navigate request.
    ///
    /// Returns `Ok(true)` if travel is now active, `Ok(false)` if the reply was discarded. If
    /// another destination was pinned while the request was in flight, the vehicle is travelling
    /// to the old one and the status says so.
    pub fn on_navigate_response(
        &mut self,
        id: RequestId,
        result: LinkResult,
        ds: &mut DataStore,
    ) -> Result<bool, NavigationError> {
        let dest_id = match self.pending_nav {
            Some((pending, dest_id)) if pending == id => dest_id,
            _ => {
                debug!("Discarding stale navigate reply {}", id);
                return Ok(false);
            }
        };
        self.pending_nav = None;

        let error = match result {
            Ok(LinkReply::Status(r)) if r.is_success() => {
                ds.travel_active = true;
                match ds.destination {
                    Some(d) if d.id == dest_id => ds.set_status("Travelling to destination"),
                    _ => {
                        warn!("Navigate accepted for a destination no longer pinned");
                        ds.set_status("Travelling to previous destination");
                    }
                }
                return Ok(true);
            }
            Ok(LinkReply::Status(r)) => NavigationError::Rejected(r.reason()),
            Ok(other) => NavigationError::Rejected(format!("unexpected reply {:?}", other)),
            Err(e) => NavigationError::ServiceUnavailable(e),
        };

        ds.set_error(error.to_string());
        Err(error)
    }

    /// Stop travelling. Local state is cleared whether or not the vehicle hears the stop.
    pub fn stop_travel(&mut self, ds: &mut DataStore, outbox: &mut Outbox) -> RequestId {
        ds.travel_active = false;
        if let Some((id, _)) = self.pending_nav.take() {
            debug!("Navigate request {} abandoned", id);
        }

        ds.set_status("Travel Stopped by User");
        outbox.push(LinkRequest::Stop)
    }

    /// Clear the destination and route and abandon any request in flight.
    ///
    /// A stop is sent if the vehicle may be travelling.
    pub fn reset(&mut self, ds: &mut DataStore, outbox: &mut Outbox) -> Option<RequestId> {
        let needs_stop = ds.travel_active || self.pending_nav.is_some();

        ds.destination = None;
        ds.route = None;
        ds.travel_active = false;
        self.pending_route = None;
        self.pending_nav = None;

        ds.set_status("Map reset. Pin a destination.");

        if needs_stop {
            warn!("Reset while travelling, stopping the vehicle");
            Some(outbox.push(LinkRequest::Stop))
        }
        else {
            None
        }
    }
}
