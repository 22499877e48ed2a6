// crates/placesearch-core/src/lib.rs

pub mod config;
pub mod controller; // The orchestrator
pub mod debounce;
pub mod error;
pub mod executor;
pub mod model;
pub mod pagination;
pub mod resolver;
pub mod text;

// Re-exports
pub use crate::config::{ClientConfig, ControllerConfig};
pub use crate::controller::{Phase, SearchController, SearchHandle, Snapshot};
pub use crate::debounce::DebounceGate;
pub use crate::error::{Result, SearchError};
#[cfg(feature = "http")]
pub use crate::executor::GeoDbClient;
pub use crate::executor::QueryExecutor;
pub use crate::model::{PageRequest, PlaceRecord, ResultPage, SearchQuery};
pub use crate::pagination::{compute_total_pages, PageSize, Pagination};
pub use crate::resolver::{CountryEntry, CountryTable, Resolver};
