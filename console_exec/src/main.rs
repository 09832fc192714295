//! Main operator console executable entry point.
//!
//! # Architecture
//!
//! The console runs a fixed period control cycle on the main thread:
//!
//!     - Operator input: commands typed at the prompt, each one widget event
//!     - Replies: responses to requests made in earlier cycles
//!     - Control: telemetry polling and throttled drive commands
//!     - Requests: everything queued this cycle is handed to the link workers
//!
//! The prompt and the HTTP requests run on their own threads so the cycle never blocks.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod repl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::mpsc::{channel, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::{net::ReqwestTransport, tc::VehicleMode};
use console_lib::{
    console::Console,
    input::OperatorAction,
    link_client::LinkClient,
    params::ConsoleExecParams,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

use repl::{LogJoystick, LogMap};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "console_exec", about = "Rover operator console")]
struct Args {
    /// Parameter file, relative to `$CONSOLE_SW_ROOT/params` unless absolute.
    #[structopt(long, parse(from_os_str), default_value = "console_exec.toml")]
    params: PathBuf,

    /// Minimum log level, one of trace, debug or info.
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("console_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Rover Operator Console\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params = if args.params.is_absolute() {
        util::params::load_path::<ConsoleExecParams, _>(&args.params)
    }
    else {
        util::params::load::<ConsoleExecParams>(&args.params.to_string_lossy())
    };
    let params = params.wrap_err("Could not load console parameters")?;

    params.validate().wrap_err("Invalid console parameters")?;

    info!("Exec parameters loaded");
    debug!("{:#?}", params);

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let transport =
        ReqwestTransport::new(&params.net).wrap_err("Failed to create the HTTP transport")?;
    let link =
        LinkClient::new(transport, &params.net).wrap_err("Failed to start the link workers")?;

    info!("Vehicle service: {}", params.net.vehicle_endpoint);
    info!("Routing service: {}", params.net.routing_endpoint);

    // ---- INITIALISE CONSOLE ----

    let mut console = Console::new(&params, LogMap::default(), LogJoystick::default());

    let (action_sender, action_reciever) = channel();
    let repl_jh = repl::spawn(session.history_path.clone(), action_sender)
        .wrap_err("Failed to start the operator prompt")?;

    info!("Type `help` for the list of commands");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = params.cycle_period();
    let mut num_consec_cycle_overruns: u64 = 0;

    'main: loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- OPERATOR INPUT ----

        loop {
            match action_reciever.try_recv() {
                Ok(OperatorAction::Event(e)) => console.handle_input(e),
                Ok(OperatorAction::ShowStatus) => repl::print_status(&console),
                Ok(OperatorAction::Quit) | Err(TryRecvError::Disconnected) => break 'main,
                Err(TryRecvError::Empty) => break,
            }
        }

        // ---- REPLIES ----

        for (id, result) in link.recieve_replies() {
            console.handle_reply(id, result);
        }

        // ---- CONTROL ----

        console.cycle(cycle_start_instant);

        // ---- REQUESTS ----

        link.send(console.take_requests())
            .wrap_err("Link workers stopped")?;

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} in a row)",
                    (cycle_dur - cycle_period).as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Shutting down");

    // Leave the vehicle stationary
    let ds = console.data_store();
    if ds.travel_active || ds.mode == VehicleMode::Manual {
        console.stop_travel();
        link.send(console.take_requests())
            .wrap_err("Could not send the final stop")?;
    }

    link.shutdown().wrap_err("Link workers did not stop cleanly")?;

    if repl_jh.join().is_err() {
        warn!("Operator prompt panicked");
    }

    // Give the log a chance to flush before exit
    thread::sleep(Duration::from_millis(10));

    info!("End of session");

    Ok(())
}
