//! # Outbox
//!
//! Requests raised by the console's components during a cycle, waiting to be handed to the link.
//! Every request gets a monotonically increasing [`RequestId`] which its reply carries back, so the
//! component that raised it can tell whether the reply is still relevant.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use comms_if::{
    net::TransportError,
    routing::RouteResponse,
    tc::{ConfigRequest, ControlRequest, LatLng, ModeRequest, NavigateRequest, StatusResponse},
    tm::{LocationReport, StateReport},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifies one request. Later requests always have larger ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Queue of requests not yet handed to the link.
#[derive(Debug, Default)]
pub struct Outbox {
    next_id: u64,
    queue: Vec<(RequestId, LinkRequest)>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// A request to one of the external services.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRequest {
    /// `GET /location`
    GetLocation,

    /// `GET /state`
    GetState,

    /// `POST /control`
    Control(ControlRequest),

    /// `POST /mode`
    SetMode(ModeRequest),

    /// `POST /config`
    Config(ConfigRequest),

    /// `POST /navigate`
    Navigate(NavigateRequest),

    /// `POST /stop`
    Stop,

    /// Route request to the routing service.
    Route { origin: LatLng, destination: LatLng },
}

/// Decoded reply to a [`LinkRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum LinkReply {
    Location(LocationReport),
    State(StateReport),
    Status(StatusResponse),

    /// A plain acknowledgement, the body is not interpreted.
    Ack,

    Route(RouteResponse),

    /// The request was never sent because a newer one of the same kind replaced it.
    Superseded,
}

pub type LinkResult = Result<LinkReply, TransportError>;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request and return its id.
    pub fn push(&mut self, request: LinkRequest) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.queue.push((id, request));
        id
    }

    /// Take every queued request, oldest first.
    pub fn drain(&mut self) -> Vec<(RequestId, LinkRequest)> {
        std::mem::take(&mut self.queue)
    }

    /// The queued requests, oldest first.
    pub fn pending(&self) -> &[(RequestId, LinkRequest)] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl LinkRequest {
    /// True for requests sent to the routing service rather than the vehicle.
    pub fn is_routing(&self) -> bool {
        matches!(self, LinkRequest::Route { .. })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            LinkRequest::GetLocation => "location",
            LinkRequest::GetState => "state",
            LinkRequest::Control(_) => "control",
            LinkRequest::SetMode(_) => "mode",
            LinkRequest::Config(_) => "config",
            LinkRequest::Navigate(_) => "navigate",
            LinkRequest::Stop => "stop",
            LinkRequest::Route { .. } => "route",
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut ob = Outbox::new();
        let a = ob.push(LinkRequest::GetLocation);
        let b = ob.push(LinkRequest::Stop);
        assert!(b > a);

        let drained = ob.drain();
        assert_eq!(drained, vec![(a, LinkRequest::GetLocation), (b, LinkRequest::Stop)]);
        assert!(ob.is_empty());

        // Ids keep increasing after a drain
        assert!(ob.push(LinkRequest::GetState) > b);
    }
}
