//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the console: the wire
//! types of the vehicle service and of the routing service, and the HTTP
//! transport used to reach them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Commands sent to the vehicle service
pub mod tc;

/// Telemetry reported by the vehicle service
pub mod tm;

/// Route requests and responses for the routing service
pub mod routing;

/// Network module
pub mod net;
