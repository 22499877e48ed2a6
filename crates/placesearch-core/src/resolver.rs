// crates/placesearch-core/src/resolver.rs

//! # Resolver
//!
//! Maps free-text place names to canonical ISO 3166-1 alpha-2 codes.
//! Resolution is pure and synchronous; the controller calls it on its own
//! task right before dispatching a fetch.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::text::fold_key;

/// Name → code lookup used by the controller.
///
/// Any `Fn(&str) -> Option<String>` is a resolver, which keeps tests and
/// custom tables cheap to write:
///
/// ```rust
/// use placesearch_core::Resolver;
///
/// let fixed = |name: &str| (name == "Paris").then(|| "FR".to_string());
/// assert_eq!(fixed.resolve("Paris").as_deref(), Some("FR"));
/// assert_eq!(fixed.resolve("Nowhereland"), None);
/// ```
pub trait Resolver: Send + Sync + 'static {
    /// Returns the canonical code for `name`, or `None` when nothing matches.
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// One row of the country table, as in the JSON:
/// `{ "iso2": "GB", "name": "United Kingdom of ...", "aliases": ["UK"] }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CountryEntry {
    pub iso2: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Country names (and aliases) indexed by their folded form.
#[derive(Clone, Debug)]
pub struct CountryTable {
    entries: Vec<CountryEntry>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

static EMBEDDED_JSON: &str = include_str!("../data/countries.json");
static EMBEDDED_TABLE: OnceCell<CountryTable> = OnceCell::new();

impl CountryTable {
    pub fn from_entries(entries: Vec<CountryEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len() * 2);
        let mut by_code = HashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            by_code.insert(entry.iso2.to_ascii_uppercase(), idx);
            // First writer wins; canonical names come before aliases of later rows.
            by_name.entry(fold_key(&entry.name)).or_insert(idx);
            for alias in &entry.aliases {
                by_name.entry(fold_key(alias)).or_insert(idx);
            }
        }

        Self {
            entries,
            by_name,
            by_code,
        }
    }

    /// The bundled ISO 3166-1 table, parsed once per process.
    pub fn embedded() -> Result<&'static CountryTable> {
        EMBEDDED_TABLE.get_or_try_init(|| Self::from_json_str(EMBEDDED_JSON))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<CountryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Loads a custom table from a `.json` file, or `.json.gz` when the
    /// `compact` feature is enabled.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_stream(path)?;
        let entries: Vec<CountryEntry> = serde_json::from_reader(reader)?;
        debug!(path = %path.display(), countries = entries.len(), "loaded country table");
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }

    /// Find a country by ISO2 code, case-insensitive (e.g. "DE", "us").
    pub fn find_by_iso2(&self, iso2: &str) -> Option<&CountryEntry> {
        self.by_code
            .get(&iso2.trim().to_ascii_uppercase())
            .map(|&idx| &self.entries[idx])
    }

    /// Find a country by name or alias, accent- and case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<&CountryEntry> {
        let key = fold_key(name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).map(|&idx| &self.entries[idx])
    }
}

impl Resolver for CountryTable {
    fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();
        let hit = self.find_by_name(name).or_else(|| {
            // A bare two-letter code is accepted as-is.
            if name.len() == 2 && name.chars().all(|c| c.is_ascii_alphabetic()) {
                self.find_by_iso2(name)
            } else {
                None
            }
        });
        hit.map(|entry| entry.iso2.clone())
    }
}

/// Opens a file, buffers it, and wraps it in a Gzip decoder when the name ends in `.gz`.
fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        SearchError::Io(std::io::Error::new(
            e.kind(),
            format!("country table not found at {}: {}", path.display(), e),
        ))
    })?;
    let reader = BufReader::new(file);
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");

    if gzipped {
        #[cfg(feature = "compact")]
        {
            use flate2::read::GzDecoder;
            return Ok(Box::new(GzDecoder::new(reader)));
        }
        #[cfg(not(feature = "compact"))]
        {
            return Err(SearchError::InvalidConfig(format!(
                "{} is gzip-compressed but the 'compact' feature is disabled",
                path.display()
            )));
        }
    }

    Ok(Box::new(reader))
}
