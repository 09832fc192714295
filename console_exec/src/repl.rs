//! # Operator prompt
//!
//! Terminal stand-ins for the map and joystick widgets, the status board, and the prompt thread
//! which turns typed commands into input events.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    path::PathBuf,
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
};

use chrono::Utc;
use comms_if::tc::LatLng;
use log::{info, warn};
use owo_colors::OwoColorize;
use rustyline::{error::ReadlineError, DefaultEditor};

use console_lib::{
    console::Console,
    data_store::FixStatus,
    input::{JoystickWidget, OperatorAction, OperatorCmd},
    map_pres::MapWidget,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "console $ ";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Map widget which reports what would be drawn in the log.
#[derive(Default)]
pub struct LogMap;

/// Joystick widget which reports its lifecycle in the log.
#[derive(Default)]
pub struct LogJoystick;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapWidget for LogMap {
    fn place_vehicle_marker(&mut self, at: LatLng) {
        info!("[map] Vehicle marker placed at {}", fmt_lat_lng(at));
    }

    fn move_vehicle_marker(&mut self, to: LatLng) {
        info!("[map] Vehicle marker moved to {}", fmt_lat_lng(to));
    }

    fn place_destination_marker(&mut self, at: LatLng) {
        info!("[map] Destination marker placed at {}", fmt_lat_lng(at));
    }

    fn move_destination_marker(&mut self, to: LatLng) {
        info!("[map] Destination marker moved to {}", fmt_lat_lng(to));
    }

    fn remove_destination_marker(&mut self) {
        info!("[map] Destination marker removed");
    }

    fn draw_route(&mut self, points: &[LatLng]) {
        info!("[map] Route drawn with {} points", points.len());
    }

    fn remove_route(&mut self) {
        info!("[map] Route removed");
    }

    fn set_view(&mut self, centre: LatLng, zoom: u8) {
        info!("[map] View centred on {} at zoom {}", fmt_lat_lng(centre), zoom);
    }

    fn fit_bounds(&mut self, south_west: LatLng, north_east: LatLng) {
        info!(
            "[map] View fitted to {} - {}",
            fmt_lat_lng(south_west),
            fmt_lat_lng(north_east)
        );
    }
}

impl JoystickWidget for LogJoystick {
    fn create(&mut self) {
        info!("[joystick] Created, use `joy <x> <y>` and `release`");
    }

    fn destroy(&mut self) {
        info!("[joystick] Destroyed");
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Start the prompt thread. Actions are sent to the control thread until the operator quits or
/// the prompt closes.
pub fn spawn(
    history_path: PathBuf,
    sender: Sender<OperatorAction>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("repl".into())
        .spawn(move || prompt_loop(history_path, sender))
}

fn prompt_loop(history_path: PathBuf, sender: Sender<OperatorAction>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            warn!("Could not start the prompt: {}", e);
            sender.send(OperatorAction::Quit).ok();
            return;
        }
    };

    if rl.load_history(&history_path).is_err() {
        info!("No prompt history found");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Prompt error: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let action = match OperatorCmd::parse_line(&line) {
            Ok(cmd) => cmd.into_action(),
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        let quit = action == OperatorAction::Quit;
        if sender.send(action).is_err() || quit {
            break;
        }
    }

    sender.send(OperatorAction::Quit).ok();

    if let Err(e) = rl.save_history(&history_path) {
        warn!("Could not save the prompt history: {}", e);
    }
}

/// Print the status board.
pub fn print_status<M: MapWidget, J: JoystickWidget>(console: &Console<M, J>) {
    let ds = console.data_store();

    let uptime = util::session::get_epoch()
        .and_then(|e| util::time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(0.0);

    println!("{}", "---- CONSOLE STATUS ----".bold());
    println!("Uptime:      {:.1} s ({} cycles)", uptime, ds.num_cycles);

    let mode = match console.mode_ctrl().mode_pending() {
        Some(p) => format!("{} (requested {})", ds.mode, p),
        None => ds.mode.to_string(),
    };
    println!("Mode:        {}", mode.cyan());

    let fix = ds.fix_status.label();
    match ds.fix_status {
        FixStatus::Locked => println!("Fix:         {}", fix.green()),
        FixStatus::Searching => println!("Fix:         {}", fix.yellow()),
        FixStatus::ConnectionError => {
            println!("Fix:         {}", fix.red())
        }
    }

    match ds.vehicle_pos {
        Some(p) => println!("Position:    {:.6}, {:.6}", p.latitude, p.longitude),
        None => println!("Position:    -"),
    }
    println!("Motion:      {} (commanded {})", ds.motion_state, ds.cmd_motion_state);
    println!("Limits:      {}", ds.limits);

    match ds.destination {
        Some(d) => println!(
            "Destination: {:.6}, {:.6}",
            d.position.latitude, d.position.longitude
        ),
        None => println!("Destination: -"),
    }

    if let Some(info) = ds.trip_info() {
        if let Some(s) = info.straight_line_label() {
            println!("Direct:      {}", s);
        }
        if let Some(d) = info.route_distance_label() {
            println!("Route:       {}", d);
        }
        if let Some(t) = info.duration_label() {
            println!("Duration:    {}", t);
        }
    }
    println!("Travelling:  {}", ds.travel_active);

    if ds.status.is_error {
        println!("Status:      {}", ds.status.text.red());
    }
    else {
        println!("Status:      {}", ds.status.text);
    }
}

fn fmt_lat_lng(p: LatLng) -> String {
    format!("{:.6}, {:.6}", p.lat, p.lng)
}
