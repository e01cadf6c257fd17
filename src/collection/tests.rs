//! Tests for the collection loader

use super::*;
use crate::error::{Error, Result};
use crate::pagination::{Page, PageRequest, Pagination, StopCondition};
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u64,
    title: String,
}

impl Identified for Row {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TestQuery {
    label_id: u64,
    per_page: u32,
}

impl PagedQuery for TestQuery {
    fn per_page(&self) -> u32 {
        self.per_page
    }
}

fn query(per_page: u32) -> TestQuery {
    TestQuery {
        label_id: 1,
        per_page,
    }
}

fn rows(ids: std::ops::Range<u64>) -> Vec<Row> {
    ids.map(|id| Row {
        id,
        title: format!("Release {id}"),
    })
    .collect()
}

fn page(items: Vec<Row>, page: u32, pages: Option<u32>) -> Result<Page<Row>> {
    Ok(Page::new(
        items,
        Pagination {
            page,
            per_page: 25,
            pages,
            items: None,
        },
    ))
}

/// Page source that replays scripted responses in order
///
/// With a gate, every fetch waits for a `Notify` permit; without one it
/// yields once so concurrent callers can interleave.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page<Row>>>>,
    requests: Mutex<Vec<PageRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Page<Row>>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn gated(responses: Vec<Result<Page<Row>>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().iter().map(|r| r.page).collect()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    type Query = TestQuery;
    type Item = Row;

    async fn fetch_page(&self, _query: &TestQuery, request: PageRequest) -> Result<Page<Row>> {
        self.requests.lock().push(request);
        match &self.gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| page(Vec::new(), request.page, None))
    }
}

fn recording_observer() -> (Arc<Mutex<Vec<CollectionChange>>>, Arc<dyn CollectionObserver>) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    let observer: Arc<dyn CollectionObserver> =
        Arc::new(move |change: &CollectionChange| sink.lock().push(change.clone()));
    (changes, observer)
}

// ============================================================================
// start()
// ============================================================================

#[tokio::test]
async fn test_start_loads_first_page_in_server_order() {
    let source = ScriptedSource::new(vec![page(rows(10..15), 1, Some(3))]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    let outcome = loader.start(query(5)).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Appended { page: 1, count: 5 });
    assert_eq!(loader.items(), rows(10..15));
    assert_eq!(source.requested_pages(), vec![1]);
    assert_eq!(loader.query(), Some(query(5)));
    assert_eq!(loader.pagination().and_then(|p| p.pages), Some(3));
    assert!(!loader.is_exhausted());
    assert!(!loader.is_loading());
}

#[tokio::test]
async fn test_start_label_with_25_items() {
    let source = ScriptedSource::new(vec![page(rows(0..25), 1, Some(4))]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    loader.start(query(25)).await.unwrap();
    let items = loader.items();

    assert_eq!(loader.len(), 25);
    assert!(loader.is_last_item(&items[24]));
    assert!(!loader.is_last_item(&items[0]));
}

#[tokio::test]
async fn test_start_failure_is_returned() {
    let source = ScriptedSource::new(vec![Err(Error::http_status(503, "down"))]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    let err = loader.start(query(25)).await.unwrap_err();

    assert!(err.is_transport());
    assert!(loader.is_empty());
    assert!(!loader.is_loading());
    assert!(loader.query().is_none());
    // No page was ever loaded, so there is nothing to continue from
    assert!(matches!(
        loader.load_next_page().await,
        Err(Error::NotStarted)
    ));
}

#[tokio::test]
async fn test_start_decode_failure_is_returned() {
    let source = ScriptedSource::new(vec![Err(Error::decode("missing field `releases`"))]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    let err = loader.start(query(25)).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_start_rejects_invalid_page_size() {
    let source = ScriptedSource::new(vec![]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    let err = loader.start(query(0)).await.unwrap_err();

    assert!(matches!(err, Error::InvalidConfigValue { .. }));
    assert!(source.requested_pages().is_empty());
}

#[tokio::test]
async fn test_start_replaces_previous_collection() {
    let source = ScriptedSource::new(vec![
        page(rows(0..3), 1, None),
        page(rows(100..102), 1, None),
    ]);
    let (changes, observer) = recording_observer();
    let loader =
        CollectionLoader::new(source.clone(), LoaderConfig::default()).with_observer(observer);

    loader.start(query(3)).await.unwrap();
    loader
        .start(TestQuery {
            label_id: 2,
            per_page: 3,
        })
        .await
        .unwrap();

    assert_eq!(loader.items(), rows(100..102));
    assert_eq!(loader.query().map(|q| q.label_id), Some(2));
    assert_eq!(source.requested_pages(), vec![1, 1]);
    assert_eq!(
        *changes.lock(),
        vec![
            CollectionChange::Reset { count: 3 },
            CollectionChange::Reset { count: 2 },
        ]
    );
}

#[tokio::test]
async fn test_single_page_collection_is_exhausted_immediately() {
    let source = ScriptedSource::new(vec![page(rows(0..7), 1, Some(1))]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    loader.start(query(25)).await.unwrap();
    assert!(loader.is_exhausted());

    let outcome = loader.load_next_page().await.unwrap();
    assert_eq!(outcome, LoadOutcome::Exhausted);
    assert_eq!(source.requested_pages(), vec![1]);
}

// ============================================================================
// is_last_item()
// ============================================================================

#[tokio::test]
async fn test_is_last_item_false_when_empty() {
    let loader = CollectionLoader::new(ScriptedSource::new(vec![]), LoaderConfig::default());
    let row = Row {
        id: 1,
        title: "Anything".to_string(),
    };

    assert!(!loader.is_last_item(&row));
}

#[tokio::test]
async fn test_is_last_item_compares_identity() {
    let source = ScriptedSource::new(vec![page(rows(0..3), 1, None)]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());
    loader.start(query(3)).await.unwrap();

    // Same id, different payload: still the same item
    let same_identity = Row {
        id: 2,
        title: "Retitled".to_string(),
    };
    assert!(loader.is_last_item(&same_identity));

    let other = Row {
        id: 1,
        title: "Release 2".to_string(),
    };
    assert!(!loader.is_last_item(&other));
}

// ============================================================================
// load_next_page()
// ============================================================================

#[tokio::test]
async fn test_load_next_page_before_start() {
    let source = ScriptedSource::new(vec![]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    assert!(matches!(
        loader.load_next_page().await,
        Err(Error::NotStarted)
    ));
    assert!(matches!(
        loader.try_load_next_page().await,
        Err(Error::NotStarted)
    ));
    assert!(source.requested_pages().is_empty());
    assert!(loader.is_empty());
}

#[tokio::test]
async fn test_load_next_page_appends_in_order() {
    let source = ScriptedSource::new(vec![
        page(rows(0..25), 1, Some(3)),
        page(rows(25..50), 2, Some(3)),
    ]);
    let (changes, observer) = recording_observer();
    let loader =
        CollectionLoader::new(source.clone(), LoaderConfig::default()).with_observer(observer);

    loader.start(query(25)).await.unwrap();
    let outcome = loader.load_next_page().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Appended { page: 2, count: 25 });
    assert!(outcome.appended());
    assert_eq!(loader.items(), rows(0..50));
    assert_eq!(source.requested_pages(), vec![1, 2]);
    assert_eq!(
        *changes.lock(),
        vec![
            CollectionChange::Reset { count: 25 },
            CollectionChange::Appended {
                page: 2,
                range: 25..50
            },
        ]
    );
}

#[tokio::test]
async fn test_empty_next_page_ends_collection() {
    let source = ScriptedSource::new(vec![
        page(rows(0..25), 1, None),
        page(Vec::new(), 2, None),
    ]);
    let (changes, observer) = recording_observer();
    let loader = CollectionLoader::new(
        source.clone(),
        LoaderConfig::default().with_stop_condition(StopCondition::EmptyPage),
    )
    .with_observer(observer);

    loader.start(query(25)).await.unwrap();
    let last = loader.item_at(24).unwrap();

    assert_eq!(loader.load_next_page().await.unwrap(), LoadOutcome::Exhausted);
    assert_eq!(loader.len(), 25);
    assert!(loader.is_exhausted());

    // The same last item keeps matching, but no further fetch happens
    assert!(loader.is_last_item(&last));
    assert_eq!(
        loader.on_item_displayed(&last).await.unwrap(),
        Some(LoadOutcome::Exhausted)
    );
    assert_eq!(loader.load_next_page().await.unwrap(), LoadOutcome::Exhausted);
    assert_eq!(source.requested_pages(), vec![1, 2]);

    // Empty pages do not notify the view
    assert_eq!(changes.lock().len(), 1);
}

#[tokio::test]
async fn test_overlapping_pages_are_not_deduplicated() {
    let source = ScriptedSource::new(vec![
        page(rows(0..3), 1, None),
        page(rows(2..5), 2, None),
    ]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    loader.start(query(3)).await.unwrap();
    loader.load_next_page().await.unwrap();

    let ids: Vec<u64> = loader.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 2, 3, 4]);
}

#[tokio::test]
async fn test_load_failure_is_absorbed_and_retried() {
    let source = ScriptedSource::new(vec![
        page(rows(0..25), 1, None),
        Err(Error::Timeout { timeout_ms: 30_000 }),
        page(rows(25..30), 2, None),
    ]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    loader.start(query(25)).await.unwrap();

    assert_eq!(loader.load_next_page().await.unwrap(), LoadOutcome::Failed);
    assert_eq!(loader.len(), 25);
    assert!(!loader.is_exhausted());
    assert!(!loader.is_loading());

    assert_eq!(
        loader.load_next_page().await.unwrap(),
        LoadOutcome::Appended { page: 2, count: 5 }
    );
    assert_eq!(source.requested_pages(), vec![1, 2, 2]);
}

#[tokio::test]
async fn test_try_load_next_page_propagates_failure() {
    let source = ScriptedSource::new(vec![
        page(rows(0..25), 1, None),
        Err(Error::http_status(502, "bad gateway")),
    ]);
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    loader.start(query(25)).await.unwrap();
    let err = loader.try_load_next_page().await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
    assert_eq!(loader.len(), 25);
}

// ============================================================================
// Concurrency and cancellation
// ============================================================================

#[tokio::test]
async fn test_concurrent_loads_fetch_page_once() {
    let source = ScriptedSource::new(vec![
        page(rows(0..25), 1, None),
        page(rows(25..50), 2, None),
        page(rows(50..75), 3, None),
    ]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());
    loader.start(query(25)).await.unwrap();

    let (first, second) = tokio::join!(loader.load_next_page(), loader.load_next_page());

    assert_eq!(first.unwrap(), LoadOutcome::Appended { page: 2, count: 25 });
    assert_eq!(second.unwrap(), LoadOutcome::InFlight);
    assert_eq!(loader.items(), rows(0..50));
    assert_eq!(source.requested_pages(), vec![1, 2]);
}

#[tokio::test]
async fn test_reset_discards_in_flight_page() {
    let gate = Arc::new(Notify::new());
    let source = ScriptedSource::gated(
        vec![page(rows(0..25), 1, None), page(rows(25..50), 2, None)],
        gate.clone(),
    );
    let (changes, observer) = recording_observer();
    let loader =
        CollectionLoader::new(source.clone(), LoaderConfig::default()).with_observer(observer);

    gate.notify_one();
    loader.start(query(25)).await.unwrap();

    let (outcome, ()) = tokio::join!(loader.load_next_page(), async {
        assert!(loader.is_loading());
        loader.reset();
        gate.notify_one();
    });

    assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
    assert!(loader.is_empty());
    assert!(loader.query().is_none());
    assert!(!loader.is_loading());
    assert_eq!(
        *changes.lock(),
        vec![CollectionChange::Reset { count: 25 }, CollectionChange::Cleared]
    );
}

#[tokio::test]
async fn test_failure_after_reset_is_discarded() {
    let gate = Arc::new(Notify::new());
    let source = ScriptedSource::gated(
        vec![
            page(rows(0..25), 1, None),
            Err(Error::http_status(503, "down")),
        ],
        gate.clone(),
    );
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    gate.notify_one();
    loader.start(query(25)).await.unwrap();

    let (outcome, ()) = tokio::join!(loader.load_next_page(), async {
        loader.reset();
        gate.notify_one();
    });

    assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
    assert!(loader.is_empty());
    assert!(!loader.is_loading());
    assert_eq!(source.requested_pages(), vec![1, 2]);
}

#[tokio::test]
async fn test_first_page_failure_after_reset_is_discarded() {
    let gate = Arc::new(Notify::new());
    let source = ScriptedSource::gated(vec![Err(Error::http_status(500, "down"))], gate.clone());
    let loader = CollectionLoader::new(source, LoaderConfig::default());

    let (outcome, ()) = tokio::join!(loader.start(query(25)), async {
        loader.reset();
        gate.notify_one();
    });

    assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
    assert!(loader.query().is_none());
    assert!(!loader.is_loading());
}

#[tokio::test]
async fn test_start_supersedes_in_flight_page() {
    let gate = Arc::new(Notify::new());
    // Responses are handed out in completion order: the restart finishes
    // before the superseded page 2 fetch is resumed
    let source = ScriptedSource::gated(
        vec![
            page(rows(0..25), 1, None),
            page(rows(100..102), 1, Some(1)),
            page(rows(25..50), 2, None),
        ],
        gate.clone(),
    );
    let (changes, observer) = recording_observer();
    let loader =
        CollectionLoader::new(source.clone(), LoaderConfig::default()).with_observer(observer);

    gate.notify_one();
    loader.start(query(25)).await.unwrap();

    let (next, restarted) = tokio::join!(loader.load_next_page(), async {
        assert!(loader.is_loading());
        // Wake the pending page 2 fetch and leave a permit for the restart
        gate.notify_one();
        gate.notify_one();
        loader
            .start(TestQuery {
                label_id: 2,
                per_page: 25,
            })
            .await
    });

    assert_eq!(next.unwrap(), LoadOutcome::Discarded);
    assert_eq!(
        restarted.unwrap(),
        LoadOutcome::Appended { page: 1, count: 2 }
    );
    assert_eq!(loader.items(), rows(100..102));
    assert_eq!(loader.query().map(|q| q.label_id), Some(2));
    assert!(loader.is_exhausted());
    assert!(!loader.is_loading());
    assert_eq!(source.requested_pages(), vec![1, 2, 1]);
    assert_eq!(
        *changes.lock(),
        vec![
            CollectionChange::Reset { count: 25 },
            CollectionChange::Reset { count: 2 },
        ]
    );
}

#[tokio::test]
async fn test_dropped_fetch_releases_in_flight_marker() {
    let gate = Arc::new(Notify::new());
    let source = ScriptedSource::gated(
        vec![page(rows(0..25), 1, None), page(rows(25..40), 2, None)],
        gate.clone(),
    );
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());

    gate.notify_one();
    loader.start(query(25)).await.unwrap();

    // Poll once, then drop the future while it waits on the network
    assert!(loader.load_next_page().now_or_never().is_none());
    assert!(!loader.is_loading());
    assert_eq!(loader.len(), 25);

    gate.notify_one();
    let outcome = loader.load_next_page().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Appended { page: 2, count: 15 });
    assert_eq!(source.requested_pages(), vec![1, 2, 2]);
}

// ============================================================================
// Trailing-edge trigger
// ============================================================================

#[tokio::test]
async fn test_on_item_displayed_only_triggers_on_last_item() {
    let source = ScriptedSource::new(vec![
        page(rows(0..3), 1, Some(2)),
        page(rows(3..6), 2, Some(2)),
    ]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());
    loader.start(query(3)).await.unwrap();

    let first = loader.item_at(0).unwrap();
    assert_eq!(loader.on_item_displayed(&first).await.unwrap(), None);
    assert_eq!(source.requested_pages(), vec![1]);

    let last = loader.item_at(2).unwrap();
    assert_eq!(
        loader.on_item_displayed(&last).await.unwrap(),
        Some(LoadOutcome::Appended { page: 2, count: 3 })
    );
    assert!(loader.is_exhausted());

    // The old last item is no longer last
    assert_eq!(loader.on_item_displayed(&last).await.unwrap(), None);
}

#[tokio::test]
async fn test_scrolling_through_whole_collection() {
    let source = ScriptedSource::new(vec![
        page(rows(0..2), 1, None),
        page(rows(2..4), 2, None),
        page(rows(4..5), 3, None),
        page(Vec::new(), 4, None),
    ]);
    let loader = CollectionLoader::new(source.clone(), LoaderConfig::default());
    loader.start(query(2)).await.unwrap();

    let mut shown = Vec::new();
    let mut index = 0;
    while let Some(row) = loader.item_at(index) {
        shown.push(row.id);
        loader.on_item_displayed(&row).await.unwrap();
        index += 1;
    }

    assert_eq!(shown, vec![0, 1, 2, 3, 4]);
    assert_eq!(source.requested_pages(), vec![1, 2, 3, 4]);
    assert!(loader.is_exhausted());
}

#[test]
fn test_loader_debug() {
    let loader = CollectionLoader::new(ScriptedSource::new(vec![]), LoaderConfig::default());
    let debug_str = format!("{loader:?}");
    assert!(debug_str.contains("CollectionLoader"));
    assert!(debug_str.contains("exhausted: false"));
}
