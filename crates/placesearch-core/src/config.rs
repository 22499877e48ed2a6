// crates/placesearch-core/src/config.rs

use std::time::Duration;

use crate::error::{Result, SearchError};
use crate::pagination::PageSize;

pub const DEFAULT_API_HOST: &str = "wft-geo-db.p.rapidapi.com";
pub const DEFAULT_API_URL: &str = "https://wft-geo-db.p.rapidapi.com/v1/geo/cities";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how the query executor talks to the remote cities API.
///
/// Built once by the caller and handed to the executor; nothing in the core
/// reads the process environment.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_host: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let config = Self {
            base_url: base_url.into().trim().to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_key: api_key.into().trim().to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SearchError::InvalidConfig(format!(
                "API URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.api_key.is_empty() {
            return Err(SearchError::InvalidConfig("API key is empty".into()));
        }
        if self.api_host.trim().is_empty() {
            return Err(SearchError::InvalidConfig("API host is empty".into()));
        }
        Ok(())
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_host", &self.api_host)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Timing and initial pagination for a [`crate::SearchController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Quiescence window for text-driven searches.
    pub debounce: Duration,
    pub default_page_size: PageSize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            default_page_size: PageSize::default(),
        }
    }
}
