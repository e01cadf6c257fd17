//! Loader configuration, outcomes and change notifications

use crate::pagination::StopCondition;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Loader configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// When to consider the collection complete
    #[serde(default)]
    pub stop_condition: StopCondition,
}

impl LoaderConfig {
    /// Set the stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

/// What a load attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and its items appended
    Appended {
        /// Page number that was fetched
        page: u32,
        /// Number of items appended
        count: usize,
    },
    /// The collection is complete; nothing was fetched
    Exhausted,
    /// Another fetch is already running; nothing was fetched
    InFlight,
    /// The query was reset or restarted while fetching; the page was dropped
    Discarded,
    /// The fetch failed and the error was logged; the page can be retried
    Failed,
}

impl LoadOutcome {
    /// Whether new items were added to the collection
    pub fn appended(&self) -> bool {
        matches!(self, Self::Appended { count, .. } if *count > 0)
    }
}

/// Change notification delivered to a [`CollectionObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    /// A new query loaded its first page; the whole list changed
    Reset {
        /// Items now in the collection
        count: usize,
    },
    /// Items were appended at the end
    Appended {
        /// Page number the items came from
        page: u32,
        /// Indices of the new items
        range: Range<usize>,
    },
    /// The collection was torn down
    Cleared,
}

/// Receives change notifications so a view can re-render
///
/// Called after the collection has been updated, never while the
/// loader's internal lock is held, so implementations may read the
/// loader again.
pub trait CollectionObserver: Send + Sync {
    /// The collection changed
    fn collection_changed(&self, change: &CollectionChange);
}

impl<F> CollectionObserver for F
where
    F: Fn(&CollectionChange) + Send + Sync,
{
    fn collection_changed(&self, change: &CollectionChange) {
        self(change);
    }
}
