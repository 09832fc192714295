//! # Console Executable Parameters
//!
//! This module provides parameters for the console executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::net::NetParams;
use serde::{Deserialize, Serialize};

use crate::drive::DriveLimits;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Shortest allowed telemetry poll period.
pub const MIN_POLL_PERIOD_S: f64 = 0.5;

/// Longest allowed telemetry poll period.
pub const MAX_POLL_PERIOD_S: f64 = 2.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleExecParams {
    /// Service endpoints and timeouts
    pub net: NetParams,

    /// Period of the control cycle.
    ///
    /// Units: seconds
    #[serde(default = "default_cycle_period_s")]
    pub cycle_period_s: f64,

    /// Period at which the vehicle's location and state are requested.
    ///
    /// Units: seconds
    pub poll_period_s: f64,

    /// Minimum time between two drive commands.
    ///
    /// Units: seconds
    #[serde(default = "default_throttle_interval_s")]
    pub throttle_interval_s: f64,

    /// Body expected by the vehicle's navigate endpoint
    #[serde(default)]
    pub navigate_contract: NavigateContract,

    /// Speed demanded while a forward or backward button is held.
    ///
    /// Units: percent
    pub button_speed: f64,

    /// Map zoom level used when centring on the vehicle
    #[serde(default = "default_zoom")]
    pub map_zoom: u8,

    /// Drive limits assumed until the operator sets their own
    pub default_limits: DriveLimits,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What the vehicle's `/navigate` endpoint accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigateContract {
    /// The full list of route points.
    Waypoints,

    /// Only the destination, the vehicle plans its own way there.
    Destination,
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Poll period must be between 0.5 and 2 s, got {0}")]
    PollPeriodOutOfRange(f64),

    #[error("The cycle period ({0} s) must be positive and shorter than the poll period")]
    InvalidCyclePeriod(f64),

    #[error("The throttle interval must be positive, got {0}")]
    InvalidThrottleInterval(f64),

    #[error("The button speed must be between 0 and 100 %, got {0}")]
    ButtonSpeedOutOfRange(f64),

    #[error("Drive limits must be between 0 and 100 %, got {0}")]
    LimitsOutOfRange(DriveLimits),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ConsoleExecParams {
    /// Check every value lies in its allowed range.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(MIN_POLL_PERIOD_S..=MAX_POLL_PERIOD_S).contains(&self.poll_period_s) {
            return Err(ParamsError::PollPeriodOutOfRange(self.poll_period_s));
        }

        if !(self.cycle_period_s > 0.0 && self.cycle_period_s < self.poll_period_s) {
            return Err(ParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        if !(self.throttle_interval_s > 0.0) {
            return Err(ParamsError::InvalidThrottleInterval(self.throttle_interval_s));
        }

        if !(0.0..=100.0).contains(&self.button_speed) {
            return Err(ParamsError::ButtonSpeedOutOfRange(self.button_speed));
        }

        let l = self.default_limits;
        if !(0.0..=100.0).contains(&l.max_speed) || !(0.0..=100.0).contains(&l.max_turn) {
            return Err(ParamsError::LimitsOutOfRange(l));
        }

        Ok(())
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_period_s)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs_f64(self.poll_period_s)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_secs_f64(self.throttle_interval_s)
    }
}

impl Default for ConsoleExecParams {
    fn default() -> Self {
        Self {
            net: NetParams {
                vehicle_endpoint: "http://rover.local:5000/api".into(),
                routing_endpoint: "https://router.project-osrm.org/route/v1/driving".into(),
                timeout_ms: 2000,
            },
            cycle_period_s: default_cycle_period_s(),
            poll_period_s: 1.0,
            throttle_interval_s: default_throttle_interval_s(),
            navigate_contract: NavigateContract::default(),
            button_speed: 50.0,
            map_zoom: default_zoom(),
            default_limits: DriveLimits::default(),
        }
    }
}

impl Default for NavigateContract {
    fn default() -> Self {
        NavigateContract::Waypoints
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_cycle_period_s() -> f64 {
    0.05
}

fn default_throttle_interval_s() -> f64 {
    0.1
}

fn default_zoom() -> u8 {
    16
}
