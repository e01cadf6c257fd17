//! Paginated collection loading
//!
//! A [`CollectionLoader`] owns the growing, ordered list of items for one
//! query and fetches further pages on demand from an injected
//! [`PageSource`]. It is built for infinite-scroll front ends: the view
//! reports every row it is about to show through
//! [`CollectionLoader::on_item_displayed`], and the loader requests the
//! next page once the last loaded item becomes visible.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use discogs_pager::collection::{CollectionLoader, LoaderConfig};
//! use discogs_pager::discogs::{DiscogsClient, ReleaseQuery};
//!
//! let loader = CollectionLoader::new(Arc::new(client), LoaderConfig::default());
//! loader.start(ReleaseQuery::label(1).with_per_page(25)).await?;
//!
//! for row in loader.items() {
//!     render(&row);
//!     loader.on_item_displayed(&row).await?;
//! }
//! ```
//!
//! Guarantees:
//! - items are appended in page order and never reordered or deduplicated
//! - at most one fetch runs at a time; overlapping triggers get
//!   [`LoadOutcome::InFlight`]
//! - `start` and `reset` invalidate in-flight fetches, whose results are
//!   then dropped ([`LoadOutcome::Discarded`])

mod loader;
mod source;
mod types;

pub use loader::CollectionLoader;
pub use source::{Identified, PageSource, PagedQuery};
pub use types::{CollectionChange, CollectionObserver, LoadOutcome, LoaderConfig};

#[cfg(test)]
mod tests;
