//! Pagination module
//!
//! Page requests, server pagination metadata, typed pages and the stop
//! conditions that decide when a paginated collection is complete.
//!
//! # Overview
//!
//! Discogs paginates list endpoints by page number. Each response carries
//! a `pagination` object:
//!
//! ```json
//! { "page": 2, "pages": 30, "per_page": 25, "items": 740 }
//! ```
//!
//! A [`Page`] pairs the decoded items of one response with that metadata,
//! and [`check_stop_condition`] decides whether another page is worth
//! requesting.

mod types;

pub use types::{
    check_stop_condition, Page, PageRequest, Pagination, StopCondition, StopResult,
    MAX_PER_PAGE,
};
