//! Error types.
//!
//! [`OperatorError`] is what every command returns; cloud API failures are
//! carried through unchanged as [`ApiError`].

use reqwest::StatusCode;

/// Failure raised by a cloud API client (Keystone, Neutron, Blazar or the
/// in-memory snapshot backend).
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Network error talking to {url}. {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} at {url}: {body}")]
    Http {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Could not deserialize response from {url}: path={path} error={message}")]
    Decode {
        url: String,
        path: String,
        message: String,
    },

    #[error("Authentication failed at {url}: {message}")]
    Auth { url: String, message: String },

    #[error("No '{service_type}' endpoint (interface={interface}) in the service catalog")]
    MissingEndpoint {
        service_type: String,
        interface: String,
    },

    #[error("{kind} {id} not found")]
    Missing { kind: &'static str, id: String },
}

/// Error returned by the operator commands.
#[derive(thiserror::Error, Debug)]
pub enum OperatorError {
    /// Missing or ambiguous command input.
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The target is in use and must not be touched.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The API returned data that cannot be interpreted (e.g. a reversed address range).
    #[error("Invalid data from API: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, OperatorError>;
