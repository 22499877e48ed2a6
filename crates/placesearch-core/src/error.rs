// crates/placesearch-core/src/error.rs

use thiserror::Error;

/// Errors produced by the search stack.
///
/// Resolver misses and empty result pages are *not* errors; the controller
/// reports them through [`crate::Phase::Empty`]. Everything here is either a
/// transport failure surfaced by a [`crate::QueryExecutor`] or a rejected input.
#[derive(Debug, Error)]
pub enum SearchError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote service answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode remote response: {0}")]
    Decode(String),

    #[error("query executor failed: {0}")]
    Executor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("page size must be an integer between {min} and {max}, got {input:?}")]
    InvalidPageSize { input: String, min: u32, max: u32 },

    #[error("search controller has shut down")]
    ControllerClosed,
}

impl SearchError {
    /// `true` for errors raised by the remote query path.
    pub fn is_transport(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            SearchError::Http(_) => true,
            SearchError::Status { .. } | SearchError::Decode(_) | SearchError::Executor(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
