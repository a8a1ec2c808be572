//! Error type shared by every Bandcamp API operation

use thiserror::Error;

/// Errors that can occur when querying the Bandcamp API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a status other than 200
    #[error("Unexpected HTTP status {status} from {endpoint}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Endpoint path that was queried
        endpoint: String,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The JSON body carried an `error` or `error_message` key
    #[error("Bandcamp API error: {0}")]
    Service(String),

    /// The response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// An identifier could not be coerced to a numeric id
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A batch lookup was called without identifiers
    #[error("At least one identifier is required")]
    EmptyBatch,

    /// A batch lookup exceeded the service limit
    #[error("Too many identifiers: {count} given, at most {max} allowed")]
    TooManyIdentifiers {
        /// Number of identifiers passed in
        count: usize,
        /// Maximum accepted by the service
        max: usize,
    },

    /// A live request was needed but no API key is configured
    #[error("An API key is required to query the Bandcamp API")]
    MissingApiKey,

    /// A configuration value could not be parsed
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Cache directory read/write error
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),
}
