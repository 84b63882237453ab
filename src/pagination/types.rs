//! Pagination types
//!
//! Defines the request/response shapes the controller reasons about.

use crate::error::{Error, Result};
use crate::types::TransactionView;
use serde::{Deserialize, Serialize};

/// Parameters of a single page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Row index the page starts at (sent to the node as the cursor)
    pub offset: u64,
    /// Number of rows requested, always positive
    pub limit: u32,
}

impl PageRequest {
    /// Build the request for a zero-based page of the given size
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            offset: u64::from(page) * u64::from(page_size),
            limit: page_size,
        }
    }

    /// The page this request fetches, assuming page-aligned offsets
    pub fn model(&self) -> PaginationModel {
        let page = self
            .offset
            .checked_div(u64::from(self.limit))
            .unwrap_or_default();
        PaginationModel {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            page_size: self.limit,
        }
    }
}

impl std::fmt::Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "offset={} limit={}", self.offset, self.limit)
    }
}

/// One page of results plus the "more data" signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage<T = TransactionView> {
    /// Items in server order
    pub data: Vec<T>,
    /// Whether the node reports rows beyond this page
    pub has_next_page: bool,
    /// Cursor the node suggests for the following page
    #[serde(default, deserialize_with = "crate::types::opt_u64_from_str_or_num")]
    pub next_cursor: Option<u64>,
}

impl<T> Default for ResultPage<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_next_page: false,
            next_cursor: None,
        }
    }
}

impl<T> ResultPage<T> {
    /// Create a page without a next cursor
    pub fn new(data: Vec<T>, has_next_page: bool) -> Self {
        Self {
            data,
            has_next_page,
            next_cursor: None,
        }
    }

    /// Number of items in the page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the page has no items
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Allowed page sizes, as offered by the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSizeOptions(Vec<u32>);

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self(vec![10, 25, 50])
    }
}

impl PageSizeOptions {
    /// Create options from a list of sizes
    pub fn new(sizes: Vec<u32>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(Error::pagination("page size options must not be empty"));
        }
        if sizes.contains(&0) {
            return Err(Error::pagination("page size options must be positive"));
        }
        Ok(Self(sizes))
    }

    /// Check a page size against the options
    pub fn validate(&self, page_size: u32) -> Result<u32> {
        if self.0.contains(&page_size) {
            Ok(page_size)
        } else {
            Err(Error::pagination(format!(
                "page size {page_size} is not one of {:?}",
                self.0
            )))
        }
    }

    /// Whether the size is allowed
    pub fn contains(&self, page_size: u32) -> bool {
        self.0.contains(&page_size)
    }

    /// Allowed sizes
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Current page index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginationModel {
    /// Zero-based page index
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
}

impl Default for PaginationModel {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 10,
        }
    }
}

impl PaginationModel {
    /// Create a model, rejecting a zero page size
    pub fn new(page: u32, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::pagination("page size must be positive"));
        }
        Ok(Self { page, page_size })
    }

    /// Same page size, different page
    #[must_use]
    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }

    /// Same page, different page size
    ///
    /// The page index is kept, so the offset becomes `page * page_size`
    /// under the new size.
    pub fn with_page_size(self, page_size: u32) -> Result<Self> {
        Self::new(self.page, page_size)
    }

    /// Move to the following page
    #[must_use]
    pub fn next(self) -> Self {
        self.with_page(self.page.saturating_add(1))
    }

    /// Move to the preceding page (stays on page 0)
    #[must_use]
    pub fn prev(self) -> Self {
        self.with_page(self.page.saturating_sub(1))
    }

    /// Fetch parameters for this model
    pub fn request(&self) -> PageRequest {
        PageRequest::for_page(self.page, self.page_size)
    }
}
