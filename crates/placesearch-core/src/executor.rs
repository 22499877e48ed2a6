// crates/placesearch-core/src/executor.rs

//! # Query Executor
//!
//! One remote fetch per call. Executors are stateless per call; the
//! controller neutralizes superseded fetches by generation stamp, so an
//! executor never needs to abort its own transport.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{PageRequest, ResultPage};

#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    async fn fetch(&self, request: PageRequest) -> Result<ResultPage>;
}

#[cfg(feature = "http")]
pub use http::GeoDbClient;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;

    use super::QueryExecutor;
    use crate::config::ClientConfig;
    use crate::error::{Result, SearchError};
    use crate::model::{CitiesResponseRaw, PageRequest, ResultPage};

    /// `QueryExecutor` backed by the GeoDB cities endpoint.
    #[derive(Clone, Debug)]
    pub struct GeoDbClient {
        http: Client,
        config: ClientConfig,
    }

    impl GeoDbClient {
        pub fn new(config: ClientConfig) -> Result<Self> {
            config.validate()?;
            let http = Client::builder().timeout(config.timeout).build()?;
            Ok(Self { http, config })
        }

        pub fn config(&self) -> &ClientConfig {
            &self.config
        }
    }

    #[async_trait]
    impl QueryExecutor for GeoDbClient {
        async fn fetch(&self, request: PageRequest) -> Result<ResultPage> {
            debug!(
                code = %request.code,
                limit = request.limit,
                offset = request.offset,
                "fetching cities page"
            );

            let response = self
                .http
                .get(&self.config.base_url)
                .query(&[
                    ("countryIds", request.code.clone()),
                    ("limit", request.limit.to_string()),
                    ("offset", request.offset.to_string()),
                ])
                .header("x-rapidapi-host", &self.config.api_host)
                .header("x-rapidapi-key", &self.config.api_key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SearchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            let raw: CitiesResponseRaw = serde_json::from_slice(&bytes)
                .map_err(|e| SearchError::Decode(e.to_string()))?;
            Ok(raw.into())
        }
    }
}
