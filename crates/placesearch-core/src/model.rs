// crates/placesearch-core/src/model.rs

use serde::{Deserialize, Serialize};

use crate::pagination::PageSize;

/// A place (city) as returned by the remote cities API.
///
/// Immutable and sourced entirely from the remote response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub population: u64,
    #[serde(rename = "country", default)]
    pub country_name: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// One page of results. Replaces the previously displayed page wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub rows: Vec<PlaceRecord>,
    pub total_count: u64,
}

impl ResultPage {
    pub fn new(rows: Vec<PlaceRecord>, total_count: u64) -> Self {
        Self { rows, total_count }
    }

    /// The search matched nothing at all. A page past the end of a non-empty
    /// result set has no rows but is not empty.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Immutable description of one user-driven search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_text: String,
    pub resolved_code: Option<String>,
    pub page: u32,
    pub page_size: PageSize,
}

impl SearchQuery {
    /// The wire request for this query, or `None` when the text did not resolve.
    pub fn page_request(&self) -> Option<PageRequest> {
        self.resolved_code
            .as_deref()
            .map(|code| PageRequest::new(code, self.page, self.page_size))
    }
}

/// What actually goes over the wire: `countryIds`, `limit`, `offset`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub code: String,
    pub limit: u32,
    pub offset: u64,
}

impl PageRequest {
    pub fn new(code: impl Into<String>, page: u32, page_size: PageSize) -> Self {
        let limit = page_size.get();
        let offset = u64::from(page.max(1) - 1) * u64::from(limit);
        Self {
            code: code.into(),
            limit,
            offset,
        }
    }
}

// -----------------------------------------------------------------------------
// Raw wire format
// -----------------------------------------------------------------------------

/// Raw response envelope, as in the JSON:
/// {
///   "data": [ { "id": 3453, "name": "Paris", "country": "France", ... } ],
///   "metadata": { "currentOffset": 0, "totalCount": 1204 }
/// }
#[derive(Debug, Deserialize)]
pub(crate) struct CitiesResponseRaw {
    #[serde(default)]
    pub data: Vec<PlaceRecord>,
    pub metadata: MetadataRaw,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataRaw {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

impl From<CitiesResponseRaw> for ResultPage {
    fn from(raw: CitiesResponseRaw) -> Self {
        ResultPage::new(raw.data, raw.metadata.total_count)
    }
}
