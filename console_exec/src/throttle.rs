//! # Command Throttle
//!
//! Limits the rate at which drive commands are forwarded to the vehicle. Only the latest intent
//! is held, anything offered while a window is open simply replaces it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::trace;

use crate::drive::DriveCommand;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CmdThrottle {
    /// Minimum time between two forwarded commands.
    interval: Duration,

    /// Latest command not yet forwarded.
    latest: Option<DriveCommand>,

    /// Time the last command was forwarded.
    last_sent: Option<Instant>,

    /// The last command forwarded.
    last_cmd: Option<DriveCommand>,

    /// Number of commands replaced before being forwarded.
    num_dropped: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl CmdThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            latest: None,
            last_sent: None,
            last_cmd: None,
            num_dropped: 0,
        }
    }

    /// Offer a command, replacing any command still waiting.
    pub fn offer(&mut self, cmd: DriveCommand) {
        if let Some(old) = self.latest.replace(cmd) {
            trace!("Throttled drive command {:?}", old);
            self.num_dropped += 1;
        }
    }

    /// Return the command to forward now, if one is waiting and the window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<DriveCommand> {
        if self.latest.is_none() {
            return None;
        }

        let open = match self.last_sent {
            Some(t) => now.saturating_duration_since(t) >= self.interval,
            None => true,
        };

        if open {
            self.last_sent = Some(now);
            self.last_cmd = self.latest.take();
            self.last_cmd
        }
        else {
            None
        }
    }

    /// Make sure the vehicle is left with a stop.
    ///
    /// Replaces any waiting command with a stop, which then goes out at the next open window.
    /// Nothing is queued if the last forwarded command was already a stop and none is waiting.
    pub fn flush_stop(&mut self) {
        let stopped = match self.last_cmd {
            Some(cmd) => cmd.is_stop(),
            None => true,
        };

        if self.latest.is_some() || !stopped {
            self.offer(DriveCommand::stop());
        }
    }

    pub fn has_pending(&self) -> bool {
        self.latest.is_some()
    }

    pub fn num_dropped(&self) -> u64 {
        self.num_dropped
    }
}
