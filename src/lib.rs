// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # discogs-pager
//!
//! Incremental, paginated loading of Discogs release listings for
//! infinite-scroll front ends.
//!
//! ## Features
//!
//! - **Collection Loader**: Append-only collection that fetches the next page
//!   when the last loaded item is shown
//! - **Concurrency Safe**: One fetch in flight at a time, stale results dropped
//!   after a reset
//! - **Discogs Client**: Label and artist release listings, label details
//! - **Robust HTTP**: Retries, backoff and a per-minute request quota
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use discogs_pager::collection::CollectionLoader;
//! use discogs_pager::config::AppConfig;
//! use discogs_pager::discogs::ReleaseQuery;
//!
//! #[tokio::main]
//! async fn main() -> discogs_pager::Result<()> {
//!     let config = AppConfig::default().with_env();
//!     let client = Arc::new(config.build_client()?);
//!     let loader = CollectionLoader::new(client, config.loader_config());
//!
//!     loader.start(ReleaseQuery::label(1).with_per_page(25)).await?;
//!
//!     let mut index = 0;
//!     while let Some(release) = loader.item_at(index) {
//!         println!("{}", release.title);
//!         loader.on_item_displayed(&release).await?;
//!         index += 1;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    CollectionLoader                      │
//! │  start(query)   load_next_page()   is_last_item(item)    │
//! └──────────────────────────────────────────────────────────┘
//!                │ PageSource                 │ CollectionObserver
//! ┌──────────────┴───────────┐      ┌─────────┴──────────────┐
//! │      DiscogsClient       │      │     view / CLI         │
//! ├──────────────────────────┤      └────────────────────────┘
//! │ HttpClient: retry,       │
//! │ backoff, rate limit,     │
//! │ credentials              │
//! └──────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Shared enums and helpers
pub mod types;

/// Credential handling
pub mod auth;

/// Discogs HTTP access: retries, quota, credentials
pub mod http;

/// Page requests, metadata and stop conditions
pub mod pagination;

/// Paginated collection loader
pub mod collection;

/// Discogs API client
pub mod discogs;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

pub use collection::{CollectionLoader, LoadOutcome, LoaderConfig};
pub use discogs::{DiscogsClient, ReleaseQuery};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
