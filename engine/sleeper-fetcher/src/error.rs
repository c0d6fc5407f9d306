//! Error types for the Sleeper fetcher

use thiserror::Error;

/// Result type for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure talking to the league data API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sleeper API error: {endpoint} returned {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        FetchError::Status {
            endpoint: endpoint.into(),
            status,
        }
    }
}
