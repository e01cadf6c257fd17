//! Pagination types
//!
//! Defines the core pagination abstractions shared by the API client and
//! the collection loader.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest page size Discogs accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Parameters for fetching one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl PageRequest {
    /// Request the first page
    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }

    /// Request the page after this one
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            per_page: self.per_page,
        }
    }

    /// Check the request is something the server will accept
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::invalid_value("page", "pages are numbered from 1"));
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::invalid_value(
                "per_page",
                format!("must be between 1 and {MAX_PER_PAGE}, got {}", self.per_page),
            ));
        }
        Ok(())
    }
}

/// Pagination metadata reported by the server
///
/// Fields the server leaves out stay `None`; nothing is inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page this response holds
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of pages, if known
    #[serde(default)]
    pub pages: Option<u32>,
    /// Total number of items, if known
    #[serde(default)]
    pub items: Option<u64>,
}

impl Pagination {
    /// Metadata for a response that reported no totals
    pub fn from_request(request: PageRequest) -> Self {
        Self {
            page: request.page,
            per_page: request.per_page,
            pages: None,
            items: None,
        }
    }

    /// True when the server says this is the last page
    pub fn is_last_page(&self) -> bool {
        matches!(self.pages, Some(pages) if self.page >= pages)
    }
}

/// One server-returned batch of items plus pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// Stop when a page comes back with no items
    EmptyPage,

    /// Stop when the page number reaches the reported total pages
    TotalPages,

    /// Stop on whichever of the above happens first
    #[default]
    EmptyOrTotalPages,
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    /// Check if we should continue
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Check a stop condition against a freshly fetched page
pub fn check_stop_condition<T>(condition: StopCondition, page: &Page<T>) -> StopResult {
    let stop = match condition {
        StopCondition::EmptyPage => page.is_empty(),
        StopCondition::TotalPages => page.pagination.is_last_page(),
        StopCondition::EmptyOrTotalPages => page.is_empty() || page.pagination.is_last_page(),
    };

    if stop {
        StopResult::Stop
    } else {
        StopResult::Continue
    }
}
