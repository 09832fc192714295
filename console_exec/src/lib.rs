//! # Console library.
//!
//! The operator console's control and telemetry core. Everything here runs on the control thread
//! except for the [`link_client`] workers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Console - runs the components on the control cycle
pub mod console;

/// Data store - the session state shared by all components
pub mod data_store;

/// Drive demands, limits and buttons
pub mod drive;

/// Operator input events and the command line that produces them
pub mod input;

/// Link client - executes requests over HTTP on worker threads
pub mod link_client;

/// Location - positions and distances
pub mod loc;

/// Map presentation - keeps the map widget in step with the session
pub mod map_pres;

/// Mode control - the operating mode and the input gate
pub mod mode_ctrl;

/// Outbox - requests waiting to be sent
pub mod outbox;

/// Console executable parameters
pub mod params;

/// Route session - destination, route and travel
pub mod route_session;

/// Command throttle - rate limits drive commands
pub mod throttle;

/// Telemetry poller - vehicle location and state
pub mod tlm_poller;
