//! # Network Module
//!
//! This module provides networking abstractions over HTTP, which is how both the vehicle service
//! and the routing service are reached. The [`HttpTransport`] trait is the seam used by the rest
//! of the software, so that tests can substitute a scripted transport for the real one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use log::trace;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// User agent sent with every request, public routing servers reject anonymous clients.
const USER_AGENT: &str = concat!("rover-console/", env!("CARGO_PKG_VERSION"));

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetParams {
    /// Base URL of the vehicle service, for example `http://rover.local:5000/api`.
    pub vehicle_endpoint: String,

    /// Base URL of the routing service, up to and including the profile, for example
    /// `https://router.project-osrm.org/route/v1/driving`.
    pub routing_endpoint: String,

    /// Timeout applied to every request.
    ///
    /// Units: milliseconds
    pub timeout_ms: u64,
}

/// HTTP transport implemented with a blocking `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Any failure to complete a request, covering the network, the HTTP status, and the body.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Could not build the HTTP client: {0}")]
    ClientBuildError(String),

    #[error("Request to {0} failed: {1}")]
    RequestFailed(String, String),

    /// A non-success status, with whatever body the server sent.
    #[error("HTTP {1} from {0}")]
    HttpStatus(String, u16, Vec<u8>),

    #[error("Could not serialize the request body: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response body: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A blocking HTTP transport.
///
/// Implementations return the raw response body of any request which completed with a success
/// status, and a [`TransportError`] for anything else. A non-success status is returned as
/// [`TransportError::HttpStatus`] carrying the response body.
pub trait HttpTransport: Send {
    /// Perform a GET request.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// Perform a POST request, with a JSON body if one is given.
    fn post(&self, url: &str, body: Option<&serde_json::Value>) -> Result<Vec<u8>, TransportError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NetParams {
    /// Build the URL of a vehicle service endpoint, e.g. `vehicle_url("location")`.
    pub fn vehicle_url(&self, path: &str) -> String {
        join_url(&self.vehicle_endpoint, path)
    }
}

impl ReqwestTransport {
    /// Create a new transport using the timeout in the network parameters.
    pub fn new(params: &NetParams) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(params.timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::ClientBuildError(e.to_string()))?;

        Ok(Self { client })
    }

    fn finish(
        url: &str,
        result: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<Vec<u8>, TransportError> {
        let response =
            result.map_err(|e| TransportError::RequestFailed(url.into(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable error body is treated as an empty one
            let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();
            return Err(TransportError::HttpStatus(url.into(), status.as_u16(), body));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| TransportError::RequestFailed(url.into(), e.to_string()))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        trace!("GET {}", url);
        Self::finish(url, self.client.get(url).send())
    }

    fn post(&self, url: &str, body: Option<&serde_json::Value>) -> Result<Vec<u8>, TransportError> {
        trace!("POST {}", url);
        let request = match body {
            Some(b) => self.client.post(url).json(b),
            None => self.client.post(url),
        };
        Self::finish(url, request.send())
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// GET a URL and decode the JSON response.
pub fn get_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &str,
) -> Result<T, TransportError> {
    let body = transport.get(url)?;
    serde_json::from_slice(&body).map_err(TransportError::DeserializeError)
}

/// POST a serializable body to a URL and decode the JSON response.
pub fn post_json<B: Serialize, T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &str,
    body: &B,
) -> Result<T, TransportError> {
    let body = post_ack(transport, url, Some(body))?;
    serde_json::from_slice(&body).map_err(TransportError::DeserializeError)
}

/// POST to a URL where only the success of the request matters, returning the raw body.
pub fn post_ack<B: Serialize>(
    transport: &dyn HttpTransport,
    url: &str,
    body: Option<&B>,
) -> Result<Vec<u8>, TransportError> {
    let value = match body {
        Some(b) => Some(serde_json::to_value(b).map_err(TransportError::SerializationError)?),
        None => None,
    };
    transport.post(url, value.as_ref())
}

/// Join a base URL and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
