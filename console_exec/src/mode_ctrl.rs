//! # Mode Control
//!
//! Holds the vehicle's operating mode and gates the operator's input on it. A mode change is a
//! request to the vehicle and is only committed once the vehicle reports success.
//!
//! In MANUAL the joystick and drive buttons produce [`DriveCommand`]s and map clicks are ignored.
//! In AUTONOMOUS and SEMI_AUTONOMOUS it is the other way around. Stopping and resetting are
//! always available.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::TransportError,
    tc::{LatLng, ModeRequest, VehicleMode},
};
use log::{debug, info, warn};

use crate::{
    data_store::DataStore,
    drive::{DriveButton, DriveCommand, DriveLimits},
    input::{InputEvent, JoystickWidget},
    outbox::{LinkReply, LinkRequest, LinkResult, Outbox, RequestId},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ModeCtrl<J: JoystickWidget> {
    joystick: J,

    /// True while the joystick widget instance exists.
    joystick_live: bool,

    /// Mode change awaiting the vehicle's answer.
    pending_mode: Option<(RequestId, VehicleMode)>,

    /// Limits awaiting the vehicle's acknowledgement.
    pending_limits: Option<(RequestId, DriveLimits)>,

    /// The operator's current manual drive demand.
    demand: DriveCommand,

    /// Speed demanded by the forward and backward buttons.
    button_speed: f64,
}

/// A committed mode change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModeChange {
    pub from: VehicleMode,
    pub to: VehicleMode,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An input event which passed the mode gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Gated {
    /// Forward this demand through the throttle.
    Drive(DriveCommand),

    /// Pin a destination at the clicked map point.
    Pin(LatLng),

    ComputeRoute,
    StartTravel,
    StopTravel,
    Reset,
    SelectMode(VehicleMode),
    SetLimits(DriveLimits),

    /// The event's source is disabled in the current mode.
    Ignored,
}

#[derive(Debug, thiserror::Error)]
pub enum ModeSwitchError {
    #[error("Mode change rejected: {0}")]
    Rejected(String),

    #[error("Mode change failed: {0}")]
    ServiceUnavailable(TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum LimitsError {
    #[error("Could not set the drive limits: {0}")]
    ServiceUnavailable(TransportError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ModeChange {
    pub fn entered_manual(&self) -> bool {
        self.to == VehicleMode::Manual && self.from != VehicleMode::Manual
    }

    pub fn left_manual(&self) -> bool {
        self.from == VehicleMode::Manual && self.to != VehicleMode::Manual
    }
}

impl<J: JoystickWidget> ModeCtrl<J> {
    pub fn new(joystick: J, button_speed: f64) -> Self {
        Self {
            joystick,
            joystick_live: false,
            pending_mode: None,
            pending_limits: None,
            demand: DriveCommand::stop(),
            button_speed,
        }
    }

    /// Pass an input event through the mode gate.
    ///
    /// Drive events update the operator's demand and the commanded motion state.
    pub fn gate(&mut self, event: InputEvent, ds: &mut DataStore) -> Gated {
        let manual = ds.mode == VehicleMode::Manual;

        let gated = match event {
            InputEvent::JoystickMove { x, y } if manual => {
                self.set_demand(DriveCommand::from_joystick(x, y), ds)
            }
            InputEvent::ButtonPress(b) if manual => {
                let mut d = self.demand;
                match b {
                    DriveButton::Forward => d.speed = self.button_speed,
                    DriveButton::Backward => d.speed = -self.button_speed,
                    DriveButton::Left => d.angle = -1.0,
                    DriveButton::Right => d.angle = 1.0,
                }
                self.set_demand(DriveCommand::new(d.speed, d.angle), ds)
            }
            InputEvent::JoystickEnd | InputEvent::ButtonRelease(_) if manual => {
                self.set_demand(DriveCommand::stop(), ds)
            }
            InputEvent::MapClick(at) if !manual => Gated::Pin(at),
            InputEvent::ComputeRoute if !manual => Gated::ComputeRoute,
            InputEvent::StartTravel if !manual => Gated::StartTravel,
            InputEvent::StopTravel => Gated::StopTravel,
            InputEvent::Reset => Gated::Reset,
            InputEvent::SelectMode(m) => Gated::SelectMode(m),
            InputEvent::SetLimits { max_speed, max_turn } => {
                Gated::SetLimits(DriveLimits::new(max_speed, max_turn))
            }
            _ => Gated::Ignored,
        };

        if gated == Gated::Ignored {
            debug!("Ignoring {:?} in {} mode", event, ds.mode);
        }

        gated
    }

    /// Ask the vehicle to change mode.
    ///
    /// Returns `None` if the vehicle is already in that mode with no other change pending. A new
    /// request supersedes any pending one.
    pub fn request_mode(
        &mut self,
        target: VehicleMode,
        ds: &mut DataStore,
        outbox: &mut Outbox,
    ) -> Option<RequestId> {
        if target == ds.mode && self.pending_mode.is_none() {
            debug!("Already in {} mode", target);
            return None;
        }

        let id = outbox.push(LinkRequest::SetMode(ModeRequest { mode: target }));
        if let Some((old, m)) = self.pending_mode.replace((id, target)) {
            debug!("Mode request {} ({}) superseded by {}", old, m, id);
        }

        ds.set_status(format!("Requesting {} mode...", target));
        Some(id)
    }

    /// Apply the vehicle's answer to a mode request.
    ///
    /// Returns the committed change, or `Ok(None)` if the reply was stale.
    pub fn on_mode_response(
        &mut self,
        id: RequestId,
        result: LinkResult,
        ds: &mut DataStore,
    ) -> Result<Option<ModeChange>, ModeSwitchError> {
        let target = match self.pending_mode {
            Some((pending, target)) if pending == id => target,
            _ => {
                debug!("Discarding stale mode reply {}", id);
                return Ok(None);
            }
        };
        self.pending_mode = None;

        let error = match result {
            Ok(LinkReply::Status(r)) if r.is_success() => {
                let change = ModeChange {
                    from: ds.mode,
                    to: target,
                };
                self.commit(change, ds);
                return Ok(Some(change));
            }
            Ok(LinkReply::Status(r)) => ModeSwitchError::Rejected(r.reason()),
            Ok(other) => ModeSwitchError::Rejected(format!("unexpected reply {:?}", other)),
            Err(e) => ModeSwitchError::ServiceUnavailable(e),
        };

        // Surface the vehicle's reason as is
        match error {
            ModeSwitchError::Rejected(ref reason) => ds.set_error(reason.clone()),
            ref e => ds.set_error(e.to_string()),
        }

        Err(error)
    }

    /// Send new drive limits to the vehicle.
    pub fn request_limits(&mut self, limits: DriveLimits, outbox: &mut Outbox) -> RequestId {
        let id = outbox.push(LinkRequest::Config(limits.into()));
        self.pending_limits = Some((id, limits));
        id
    }

    /// Apply the vehicle's acknowledgement of new limits.
    pub fn on_config_response(
        &mut self,
        id: RequestId,
        result: LinkResult,
        ds: &mut DataStore,
    ) -> Result<Option<DriveLimits>, LimitsError> {
        let limits = match self.pending_limits {
            Some((pending, limits)) if pending == id => limits,
            _ => {
                debug!("Discarding stale config reply {}", id);
                return Ok(None);
            }
        };
        self.pending_limits = None;

        match result {
            Ok(_) => {
                ds.limits = limits;
                ds.set_status(format!("Drive limits set: {}", limits));
                Ok(Some(limits))
            }
            Err(e) => {
                let e = LimitsError::ServiceUnavailable(e);
                ds.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// The operator's current manual drive demand.
    pub fn demand(&self) -> DriveCommand {
        self.demand
    }

    pub fn joystick(&self) -> &J {
        &self.joystick
    }

    pub fn joystick_live(&self) -> bool {
        self.joystick_live
    }

    pub fn mode_pending(&self) -> Option<VehicleMode> {
        self.pending_mode.map(|(_, m)| m)
    }

    fn set_demand(&mut self, demand: DriveCommand, ds: &mut DataStore) -> Gated {
        self.demand = demand;
        ds.cmd_motion_state = demand.motion_state();
        Gated::Drive(demand)
    }

    fn commit(&mut self, change: ModeChange, ds: &mut DataStore) {
        ds.mode = change.to;
        info!("Mode changed from {} to {}", change.from, change.to);

        if change.entered_manual() {
            self.demand = DriveCommand::stop();
            ds.cmd_motion_state = self.demand.motion_state();
            if !self.joystick_live {
                self.joystick.create();
                self.joystick_live = true;
            }
        }
        else if change.left_manual() {
            self.demand = DriveCommand::stop();
            if self.joystick_live {
                self.joystick.destroy();
                self.joystick_live = false;
            }
            else {
                warn!("Leaving MANUAL mode without a live joystick");
            }
        }

        ds.set_status(format!("Mode set to {}", change.to));
    }
}
