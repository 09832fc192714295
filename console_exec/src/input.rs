//! # Operator Input
//!
//! Typed events produced by the map, joystick and button widgets, and the operator command line
//! which stands in for them in the executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::{LatLng, VehicleMode};
use structopt::{clap::AppSettings, StructOpt};

use crate::drive::DriveButton;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The virtual joystick widget. Only one instance may be live at a time.
pub trait JoystickWidget {
    fn create(&mut self);
    fn destroy(&mut self);
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event raised by one of the operator's input widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The map was clicked at the given point.
    MapClick(LatLng),

    /// The joystick was moved. `x` is right positive, `y` is forwards positive.
    JoystickMove { x: f64, y: f64 },

    /// The joystick was released.
    JoystickEnd,

    ButtonPress(DriveButton),
    ButtonRelease(DriveButton),

    SelectMode(VehicleMode),

    ComputeRoute,
    StartTravel,
    StopTravel,
    Reset,

    SetLimits { max_speed: f64, max_turn: f64 },
}

/// A command typed at the operator prompt.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "console",
    setting = AppSettings::NoBinaryName,
    global_setting = AppSettings::DisableVersion
)]
pub enum OperatorCmd {
    /// Click the map at the given point, pinning a destination.
    #[structopt(name = "click", setting = AppSettings::AllowNegativeNumbers)]
    Click { lat: f64, lng: f64 },

    /// Deflect the joystick. Both axes are in [-1, 1].
    #[structopt(name = "joy", setting = AppSettings::AllowNegativeNumbers)]
    Joy {
        /// Right-left deflection, negative is left
        x: f64,

        /// Forwards-backwards deflection, positive is forwards
        y: f64,
    },

    /// Release the joystick.
    #[structopt(name = "release")]
    Release,

    /// Press a drive button (forward, backward, left, right).
    #[structopt(name = "press")]
    Press { button: DriveButton },

    /// Lift a drive button.
    #[structopt(name = "lift")]
    Lift { button: DriveButton },

    /// Request a mode change (auto, manual, semi).
    #[structopt(name = "mode")]
    Mode { mode: VehicleMode },

    /// Compute a route from the vehicle to the pinned destination.
    #[structopt(name = "route")]
    Route,

    /// Start travelling along the computed route.
    #[structopt(name = "go")]
    Go,

    /// Stop travelling.
    #[structopt(name = "stop")]
    Stop,

    /// Clear the destination and route.
    #[structopt(name = "reset")]
    Reset,

    /// Set the drive limits, both in percent.
    #[structopt(name = "limits", setting = AppSettings::AllowNegativeNumbers)]
    Limits { max_speed: f64, max_turn: f64 },

    /// Print the console status board.
    #[structopt(name = "status")]
    Status,

    /// Exit the console.
    #[structopt(name = "quit", alias = "exit")]
    Quit,
}

/// What the prompt should do with a parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    Event(InputEvent),
    ShowStatus,
    Quit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperatorCmd {
    /// Parse one line typed at the prompt.
    pub fn parse_line(line: &str) -> Result<Self, structopt::clap::Error> {
        Self::from_iter_safe(line.split_whitespace())
    }

    pub fn into_action(self) -> OperatorAction {
        let event = match self {
            OperatorCmd::Click { lat, lng } => InputEvent::MapClick(LatLng { lat, lng }),
            OperatorCmd::Joy { x, y } => InputEvent::JoystickMove { x, y },
            OperatorCmd::Release => InputEvent::JoystickEnd,
            OperatorCmd::Press { button } => InputEvent::ButtonPress(button),
            OperatorCmd::Lift { button } => InputEvent::ButtonRelease(button),
            OperatorCmd::Mode { mode } => InputEvent::SelectMode(mode),
            OperatorCmd::Route => InputEvent::ComputeRoute,
            OperatorCmd::Go => InputEvent::StartTravel,
            OperatorCmd::Stop => InputEvent::StopTravel,
            OperatorCmd::Reset => InputEvent::Reset,
            OperatorCmd::Limits { max_speed, max_turn } => {
                InputEvent::SetLimits { max_speed, max_turn }
            }
            OperatorCmd::Status => return OperatorAction::ShowStatus,
            OperatorCmd::Quit => return OperatorAction::Quit,
        };

        OperatorAction::Event(event)
    }
}
