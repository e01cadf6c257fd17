//! Contracts between the loader and the API client that feeds it

use crate::error::Result;
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use std::fmt::Debug;

/// Items that can be told apart by an identity key
///
/// The loader uses the key to answer "is this the last loaded item",
/// so two values with the same key are the same item for that purpose.
pub trait Identified {
    /// Identity key type
    type Id: PartialEq + Debug;

    /// Identity of this item
    fn id(&self) -> Self::Id;
}

/// A query descriptor that knows its page size
pub trait PagedQuery: Clone + Debug + Send + Sync + 'static {
    /// Items per page to request
    fn per_page(&self) -> u32;
}

/// Fetches single pages of a remote collection
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Query descriptor
    type Query: PagedQuery;

    /// Item type returned in pages
    type Item: Identified + Clone + Debug + Send + Sync + 'static;

    /// Fetch one page for a query
    async fn fetch_page(
        &self,
        query: &Self::Query,
        request: PageRequest,
    ) -> Result<Page<Self::Item>>;
}
