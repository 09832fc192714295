//! # Telemetry Poller
//!
//! Requests the vehicle's location and state at a fixed cadence and folds the replies into the
//! data store. Polling carries on in every mode and through connection failures.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::{
    data_store::{DataStore, FixStatus},
    loc::Position,
    outbox::{LinkReply, LinkRequest, LinkResult, Outbox, RequestId},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct TlmPoller {
    period: Duration,

    last_poll: Option<Instant>,

    /// Location request handed out and not yet answered.
    location_in_flight: Option<RequestId>,

    state_in_flight: Option<RequestId>,

    /// Id of the last location reply applied to the data store.
    last_location_id: Option<RequestId>,

    /// Id of the last state reply applied to the data store.
    last_state_id: Option<RequestId>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What a location reply changed.
#[derive(Debug, Clone, PartialEq)]
pub enum TlmUpdate {
    /// An older reply than one already applied, discarded.
    Stale,

    /// The vehicle has no fix yet.
    Searching,

    /// The request failed.
    ConnectionLost,

    /// A real position, `first` is set for the first fix of the session.
    Fix { position: Position, first: bool },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TlmPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_poll: None,
            location_in_flight: None,
            state_in_flight: None,
            last_location_id: None,
            last_state_id: None,
        }
    }

    /// Queue location and state requests if a poll is due.
    ///
    /// A request whose previous poll is still unanswered is skipped for this period, so a slow
    /// vehicle holds at most one location and one state request. Returns true if anything was
    /// queued.
    pub fn poll(&mut self, now: Instant, outbox: &mut Outbox) -> bool {
        let due = match self.last_poll {
            Some(t) => now.saturating_duration_since(t) >= self.period,
            None => true,
        };

        if !due {
            return false;
        }
        self.last_poll = Some(now);

        let mut queued = false;

        match self.location_in_flight {
            Some(id) => debug!("Location request {} still unanswered, skipping poll", id),
            None => {
                self.location_in_flight = Some(outbox.push(LinkRequest::GetLocation));
                queued = true;
            }
        }

        match self.state_in_flight {
            Some(id) => debug!("State request {} still unanswered, skipping poll", id),
            None => {
                self.state_in_flight = Some(outbox.push(LinkRequest::GetState));
                queued = true;
            }
        }

        queued
    }

    /// True while a location or state request is waiting for its reply.
    pub fn is_waiting(&self) -> bool {
        self.location_in_flight.is_some() || self.state_in_flight.is_some()
    }

    /// Apply the reply to a location request.
    pub fn on_location(
        &mut self,
        id: RequestId,
        result: LinkResult,
        ds: &mut DataStore,
    ) -> TlmUpdate {
        if self.location_in_flight == Some(id) {
            self.location_in_flight = None;
        }

        if is_stale(self.last_location_id, id) {
            debug!("Discarding stale location reply {}", id);
            return TlmUpdate::Stale;
        }
        self.last_location_id = Some(id);

        let report = match result {
            Ok(LinkReply::Location(r)) => r,
            Ok(other) => {
                warn!("Unexpected reply to location request: {:?}", other);
                return TlmUpdate::Stale;
            }
            Err(e) => {
                ds.num_consec_poll_errors += 1;
                if ds.num_consec_poll_errors == 1 {
                    warn!("Location request failed: {}", e);
                }
                else {
                    debug!("Location request failed ({} in a row): {}", ds.num_consec_poll_errors, e);
                }
                set_fix_status(ds, FixStatus::ConnectionError);
                return TlmUpdate::ConnectionLost;
            }
        };

        ds.num_consec_poll_errors = 0;
        let position = Position::from(report);

        // The sentinel leaves the last known position and its marker in place
        if !position.is_fix() {
            set_fix_status(ds, FixStatus::Searching);
            return TlmUpdate::Searching;
        }

        let first = ds.vehicle_pos.is_none();
        if first {
            info!(
                "First fix acquired at {:.6}, {:.6}",
                position.latitude, position.longitude
            );
        }

        ds.vehicle_pos = Some(position);
        set_fix_status(ds, FixStatus::Locked);

        TlmUpdate::Fix { position, first }
    }

    /// Apply the reply to a state request.
    pub fn on_state(&mut self, id: RequestId, result: LinkResult, ds: &mut DataStore) {
        if self.state_in_flight == Some(id) {
            self.state_in_flight = None;
        }

        if is_stale(self.last_state_id, id) {
            debug!("Discarding stale state reply {}", id);
            return;
        }
        self.last_state_id = Some(id);

        match result {
            Ok(LinkReply::State(report)) => {
                ds.motion_state = report.motion_state();

                let reported = report.mode();
                if reported != ds.reported_mode {
                    match reported {
                        Some(m) if m != ds.mode => warn!(
                            "Vehicle reports mode {} but the console's mode is {}",
                            m, ds.mode
                        ),
                        None => warn!("Vehicle reports an unknown mode {:?}", report.mode),
                        _ => (),
                    }
                }
                ds.reported_mode = reported;
            }
            Ok(other) => warn!("Unexpected reply to state request: {:?}", other),
            // Failures are already reported through the location poll
            Err(e) => debug!("State request failed: {}", e),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn is_stale(last_applied: Option<RequestId>, id: RequestId) -> bool {
    matches!(last_applied, Some(last) if id <= last)
}

/// Update the fix status, changing the operator status only on a transition.
fn set_fix_status(ds: &mut DataStore, status: FixStatus) {
    if ds.fix_status == status {
        return;
    }

    ds.fix_status = status;
    match status {
        FixStatus::ConnectionError => ds.set_error(status.status_text()),
        _ => ds.set_status(status.status_text()),
    }
}
