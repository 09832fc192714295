//! # Console
//!
//! Ties the console's components together on the control thread. Each cycle the console:
//!
//! 1. handles the operator's input events through the mode gate,
//! 2. applies the replies to requests made in earlier cycles,
//! 3. queues telemetry polls and the throttled drive command,
//! 4. hands every queued request to the link.
//!
//! The console never blocks on the network, so it can be driven from tests with a fake clock.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::HashMap, time::Instant};

use comms_if::tc::VehicleMode;
use log::{debug, trace, warn};

use crate::{
    data_store::DataStore,
    input::{InputEvent, JoystickWidget},
    map_pres::{MapPres, MapWidget},
    mode_ctrl::{Gated, ModeCtrl},
    outbox::{LinkReply, LinkRequest, LinkResult, Outbox, RequestId},
    params::ConsoleExecParams,
    route_session::{NavigationError, RouteError, RouteSession},
    throttle::CmdThrottle,
    tlm_poller::{TlmPoller, TlmUpdate},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Console<M: MapWidget, J: JoystickWidget> {
    ds: DataStore,

    tlm_poller: TlmPoller,
    mode_ctrl: ModeCtrl<J>,
    throttle: CmdThrottle,
    route_session: RouteSession,
    map_pres: MapPres<M>,

    outbox: Outbox,

    /// Requests handed to the link whose replies have not arrived yet.
    in_flight: HashMap<RequestId, LinkRequest>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M: MapWidget, J: JoystickWidget> Console<M, J> {
    pub fn new(params: &ConsoleExecParams, map: M, joystick: J) -> Self {
        Self {
            ds: DataStore::new(params.default_limits),
            tlm_poller: TlmPoller::new(params.poll_period()),
            mode_ctrl: ModeCtrl::new(joystick, params.button_speed),
            throttle: CmdThrottle::new(params.throttle_interval()),
            route_session: RouteSession::new(params.navigate_contract),
            map_pres: MapPres::new(map, params.map_zoom),
            outbox: Outbox::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Handle one operator input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        match self.mode_ctrl.gate(event, &mut self.ds) {
            Gated::Ignored => (),
            Gated::Drive(cmd) => self.throttle.offer(cmd),
            Gated::Pin(at) => {
                let position = self.map_pres.click_to_position(at);
                if let Ok(dest) = self.route_session.pin(position, &mut self.ds) {
                    self.map_pres.clear_route();
                    self.map_pres.show_destination(&dest.position);
                }
            }
            Gated::ComputeRoute => {
                self.compute_route().ok();
            }
            Gated::StartTravel => {
                self.start_travel().ok();
            }
            Gated::StopTravel => {
                self.stop_travel();
            }
            Gated::Reset => self.reset(),
            Gated::SelectMode(m) => {
                self.request_mode(m);
            }
            Gated::SetLimits(limits) => {
                self.mode_ctrl.request_limits(limits, &mut self.outbox);
            }
        }
    }

    /// Request a route from the vehicle to the pinned destination.
    pub fn compute_route(&mut self) -> Result<RequestId, RouteError> {
        self.route_session
            .compute_route_from_store(&mut self.ds, &mut self.outbox)
    }

    /// Hand the current route to the vehicle.
    pub fn start_travel(&mut self) -> Result<RequestId, NavigationError> {
        self.route_session.start_travel(&mut self.ds, &mut self.outbox)
    }

    pub fn stop_travel(&mut self) -> RequestId {
        self.route_session.stop_travel(&mut self.ds, &mut self.outbox)
    }

    /// Clear the trip and recentre the map on the vehicle.
    pub fn reset(&mut self) {
        self.route_session.reset(&mut self.ds, &mut self.outbox);
        self.map_pres.reset(self.ds.vehicle_pos.as_ref());
    }

    pub fn request_mode(&mut self, mode: VehicleMode) -> Option<RequestId> {
        self.mode_ctrl
            .request_mode(mode, &mut self.ds, &mut self.outbox)
    }

    /// Apply the reply to a request handed out by [`Console::take_requests`].
    pub fn handle_reply(&mut self, id: RequestId, result: LinkResult) {
        let request = match self.in_flight.remove(&id) {
            Some(r) => r,
            None => {
                warn!("Reply {} does not match any request", id);
                return;
            }
        };

        if let Ok(LinkReply::Superseded) = result {
            trace!("{} request {} superseded", request.name(), id);
            return;
        }

        match &request {
            LinkRequest::GetLocation => {
                if let TlmUpdate::Fix { position, first } =
                    self.tlm_poller.on_location(id, result, &mut self.ds)
                {
                    self.map_pres.on_vehicle_fix(&position, first);
                }
            }
            LinkRequest::GetState => self.tlm_poller.on_state(id, result, &mut self.ds),
            LinkRequest::SetMode(_) => {
                if let Ok(Some(change)) =
                    self.mode_ctrl.on_mode_response(id, result, &mut self.ds)
                {
                    if change.left_manual() {
                        self.throttle.flush_stop();
                    }
                }
            }
            LinkRequest::Config(_) => {
                self.mode_ctrl.on_config_response(id, result, &mut self.ds).ok();
            }
            LinkRequest::Route { .. } => {
                if let Ok(Some(route)) =
                    self.route_session.on_route_response(id, result, &mut self.ds)
                {
                    self.map_pres.show_route(&route, self.ds.vehicle_pos.as_ref());
                }
            }
            LinkRequest::Navigate(_) => {
                self.route_session
                    .on_navigate_response(id, result, &mut self.ds)
                    .ok();
            }
            LinkRequest::Control(_) | LinkRequest::Stop => {
                if let Err(e) = result {
                    warn!("{} command {} failed: {}", request.name(), id, e);
                }
            }
        }
    }

    /// Run one control cycle.
    pub fn cycle(&mut self, now: Instant) {
        self.tlm_poller.poll(now, &mut self.outbox);

        if let Some(cmd) = self.throttle.tick(now) {
            debug!("Sending drive command {:?}", cmd);
            self.outbox.push(LinkRequest::Control(cmd.into()));
        }

        self.ds.num_cycles += 1;
    }

    /// Take every queued request for sending, remembering each until its reply arrives.
    pub fn take_requests(&mut self) -> Vec<(RequestId, LinkRequest)> {
        let requests = self.outbox.drain();
        for (id, request) in requests.iter() {
            self.in_flight.insert(*id, request.clone());
        }
        requests
    }

    pub fn data_store(&self) -> &DataStore {
        &self.ds
    }

    pub fn map(&self) -> &MapPres<M> {
        &self.map_pres
    }

    pub fn mode_ctrl(&self) -> &ModeCtrl<J> {
        &self.mode_ctrl
    }

    pub fn num_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
