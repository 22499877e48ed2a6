// crates/placesearch-core/src/pagination.rs

//! # Pagination
//!
//! Owns the current page, the page size and the derived total-page count.
//! The controller is the only writer; the presentation layer sees the
//! derived booleans through [`crate::Snapshot`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// A page size that is always within `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub fn new(n: u32) -> Result<Self> {
        if (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&n) {
            Ok(Self(n))
        } else {
            Err(invalid_page_size(n.to_string()))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = SearchError;

    fn try_from(n: u32) -> Result<Self> {
        Self::new(n)
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> u32 {
        size.0
    }
}

/// Parses what a user typed into the page-size box.
///
/// Anything that is not an integer in range (`"0"`, `"11"`, `"-1"`, `"abc"`,
/// `"2.5"`) is rejected.
impl FromStr for PageSize {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let n: i64 = s.trim().parse().map_err(|_| invalid_page_size(s))?;
        u32::try_from(n)
            .map_err(|_| invalid_page_size(s))
            .and_then(|n| Self::new(n).map_err(|_| invalid_page_size(s)))
    }
}

fn invalid_page_size(input: impl Into<String>) -> SearchError {
    SearchError::InvalidPageSize {
        input: input.into(),
        min: MIN_PAGE_SIZE,
        max: MAX_PAGE_SIZE,
    }
}

/// `ceil(total_count / page_size)`; zero results means zero pages.
///
/// ```rust
/// use placesearch_core::pagination::{compute_total_pages, PageSize};
///
/// let five = PageSize::new(5).unwrap();
/// assert_eq!(compute_total_pages(12, five), 3);
/// assert_eq!(compute_total_pages(0, five), 0);
/// ```
pub fn compute_total_pages(total_count: u64, page_size: PageSize) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.get()));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Pagination view state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    page_size: PageSize,
    total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Highest page the current page may take: `max(total_pages, 1)`.
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.last_page()
    }

    /// Moves to page `n`.
    ///
    /// Returns `false` (state unchanged) when `n` is already current or falls
    /// outside `[1, last_page]`.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n == self.current_page || n < 1 || n > self.last_page() {
            return false;
        }
        self.current_page = n;
        true
    }

    /// Switches the page size and rewinds to page 1.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.current_page = 1;
    }

    /// Recomputes the total from a fresh result count, keeping the current
    /// page inside the new bounds.
    pub fn apply_total(&mut self, total_count: u64) {
        self.total_pages = compute_total_pages(total_count, self.page_size);
        self.current_page = self.current_page.clamp(1, self.last_page());
    }

    /// Forgets the total (resolver miss, empty result).
    pub fn clear(&mut self) {
        self.total_pages = 0;
        self.current_page = 1;
    }
}
