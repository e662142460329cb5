use std::sync::Arc;

use async_trait::async_trait;
use vitrine_core::Product;
use vitrine_pins::{MemoryPinStore, PinStore, PinStoreError};

use super::*;

const COLLECTION: i64 = 7;

fn product(code: &str, color: &str) -> Product {
    Product {
        product_code: code.to_string(),
        color_code: color.to_string(),
        name: None,
        out_of_stock: false,
        is_sale_b2b: false,
        image_url: format!("https://cdn.example.com/{code}-{color}.jpg"),
    }
}

fn listing() -> Vec<Product> {
    vec![product("A", "1"), product("B", "2"), product("C", "3")]
}

fn engine_with(store: Arc<dyn PinStore>) -> CurationEngine {
    let mut engine = CurationEngine::new(COLLECTION, store);
    engine.recompute_view(&listing());
    engine
}

fn keys(engine: &CurationEngine) -> Vec<&str> {
    engine.pinned_keys().iter().map(String::as_str).collect()
}

fn view_keys(engine: &CurationEngine) -> Vec<String> {
    engine.pinned_view().iter().map(Product::key).collect()
}

/// Reads succeed from an inner memory store; writes always fail.
struct ReadOnlyStore {
    inner: MemoryPinStore,
}

#[async_trait]
impl PinStore for ReadOnlyStore {
    async fn get(&self, collection_id: i64) -> Result<Vec<String>, PinStoreError> {
        self.inner.get(collection_id).await
    }

    async fn set(
        &self,
        _collection_id: i64,
        _keys: &[String],
    ) -> Result<Vec<String>, PinStoreError> {
        Err(PinStoreError::Io {
            path: "/read-only/pins.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[tokio::test]
async fn load_adopts_stored_pins_and_builds_view() {
    let store = Arc::new(MemoryPinStore::with_pins(COLLECTION, &["B-2", "A-1"]));
    let mut engine = engine_with(store);

    engine.load().await.unwrap();

    assert_eq!(keys(&engine), vec!["B-2", "A-1"]);
    assert_eq!(view_keys(&engine), vec!["B-2", "A-1"]);
    assert_eq!(engine.last_synced(), engine.pinned_keys());
    assert!(!engine.is_loading());
    assert!(!engine.has_unsaved_changes());
}

#[tokio::test]
async fn load_drops_duplicate_keys() {
    let store = Arc::new(MemoryPinStore::with_pins(COLLECTION, &["A-1", "B-2", "A-1"]));
    let mut engine = engine_with(store);

    engine.load().await.unwrap();

    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
}

#[test]
fn toggle_twice_restores_original_keys() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    let before = engine.pinned_keys().to_vec();

    assert!(engine.toggle_pin("B", "2"));
    assert!(!engine.toggle_pin("B", "2"));

    assert_eq!(engine.pinned_keys(), before.as_slice());
}

#[test]
fn toggle_never_duplicates_a_key() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("A", "1");
    engine.toggle_pin("A", "1");

    assert_eq!(keys(&engine), vec!["A-1"]);
}

#[test]
fn drop_pin_only_adds_unpinned_products() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    let a = product("A", "1");

    assert!(engine.drop_pin(&a));
    assert!(!engine.drop_pin(&a));
    assert_eq!(keys(&engine), vec!["A-1"]);
}

#[test]
fn reorder_preserves_membership() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("B", "2");
    engine.toggle_pin("C", "3");

    let mut before = engine.pinned_keys().to_vec();
    for (from, to) in [(0, 2), (2, 1), (1, 0), (0, 1)] {
        assert!(engine.reorder(from, to));
    }
    let mut after = engine.pinned_keys().to_vec();
    before.sort();
    after.sort();

    assert_eq!(before, after);
}

#[test]
fn reorder_moves_down_after_target() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("B", "2");
    engine.toggle_pin("C", "3");

    assert!(engine.reorder(0, 2));

    assert_eq!(keys(&engine), vec!["B-2", "C-3", "A-1"]);
    assert_eq!(view_keys(&engine), vec!["B-2", "C-3", "A-1"]);
}

#[test]
fn reorder_out_of_range_is_noop() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("B", "2");

    assert!(!engine.reorder(0, 5));
    assert!(!engine.reorder(9, 0));
    assert!(!engine.reorder(1, 1));
    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
}

#[tokio::test]
async fn reorder_keeps_orphans_in_place() {
    let store = Arc::new(MemoryPinStore::with_pins(
        COLLECTION,
        &["A-1", "GONE-9", "B-2", "C-3"],
    ));
    let mut engine = engine_with(store);
    engine.load().await.unwrap();

    assert_eq!(view_keys(&engine), vec!["A-1", "B-2", "C-3"]);
    assert_eq!(engine.orphaned_keys(), vec!["GONE-9"]);

    // view index 2 (C-3) to view index 0 (A-1)
    assert!(engine.reorder(2, 0));

    assert_eq!(keys(&engine), vec!["C-3", "A-1", "GONE-9", "B-2"]);
    assert_eq!(view_keys(&engine), vec!["C-3", "A-1", "B-2"]);
}

#[test]
fn view_follows_listing_changes() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("C", "3");

    engine.recompute_view(&[product("C", "3")]);

    assert_eq!(view_keys(&engine), vec!["C-3"]);
    assert_eq!(keys(&engine), vec!["A-1", "C-3"]);
    assert_eq!(engine.orphaned_keys(), vec!["A-1"]);
}

#[tokio::test]
async fn pin_reorder_and_commit_scenario() {
    let store = Arc::new(MemoryPinStore::new());
    let mut engine = engine_with(store.clone());
    engine.load().await.unwrap();
    engine.enter_editing();

    engine.toggle_pin("A", "1");
    engine.toggle_pin("B", "2");
    engine.toggle_pin("C", "3");
    assert!(engine.reorder(2, 0));
    assert_eq!(keys(&engine), vec!["C-3", "A-1", "B-2"]);

    engine.commit().await.unwrap();

    assert_eq!(store.get(COLLECTION).await.unwrap(), vec!["C-3", "A-1", "B-2"]);
    assert!(!engine.is_saving());
    assert!(!engine.is_editing());
    assert_eq!(engine.last_synced(), engine.pinned_keys());
}

#[tokio::test]
async fn toggle_reorder_and_confirmed_removal_scenario() {
    let store = Arc::new(MemoryPinStore::with_pins(COLLECTION, &["A-1", "B-2"]));
    let mut engine = engine_with(store.clone());
    engine.load().await.unwrap();
    engine.enter_editing();

    engine.toggle_pin("C", "3");
    assert_eq!(keys(&engine), vec!["A-1", "B-2", "C-3"]);

    assert!(engine.reorder(2, 0));
    assert_eq!(keys(&engine), vec!["C-3", "A-1", "B-2"]);

    engine.request_removal("A", "1");
    engine.cancel_removal();
    assert_eq!(keys(&engine), vec!["C-3", "A-1", "B-2"]);

    engine.request_removal("A", "1");
    engine.confirm_removal();
    assert_eq!(keys(&engine), vec!["C-3", "B-2"]);

    engine.commit().await.unwrap();
    assert_eq!(store.get(COLLECTION).await.unwrap(), vec!["C-3", "B-2"]);
}

#[test]
fn second_commit_is_rejected_while_saving() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");

    let ticket = engine.begin_commit().unwrap();
    assert!(engine.is_saving());
    let err = engine.begin_commit().unwrap_err();
    assert!(matches!(
        err,
        EngineError::CommitInProgress {
            collection_id: COLLECTION
        }
    ));

    assert!(engine
        .complete_commit(ticket, Ok(vec!["A-1".to_string()]))
        .unwrap());
    assert!(!engine.is_saving());
    assert!(engine.begin_commit().is_ok());
}

#[test]
fn duplicate_commit_reply_is_ignored() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.enter_editing();
    engine.toggle_pin("Z", "9");

    let ticket = engine.begin_commit().unwrap();
    assert!(engine
        .complete_commit(ticket.clone(), Ok(vec!["Z-9".to_string()]))
        .unwrap());

    let adopted = engine
        .complete_commit(ticket, Ok(vec!["Y-8".to_string()]))
        .unwrap();

    assert!(!adopted);
    assert_eq!(engine.pinned_keys(), ["Z-9".to_string()]);
    assert_eq!(engine.last_synced(), ["Z-9".to_string()]);
    assert!(!engine.is_saving());
}

#[test]
fn late_reply_from_an_earlier_commit_is_ignored() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.enter_editing();
    engine.toggle_pin("A", "1");

    let first = engine.begin_commit().unwrap();
    engine
        .complete_commit(
            first.clone(),
            Err(PinStoreError::MalformedEntry {
                key: "pinnedProducts_7".to_string(),
            }),
        )
        .unwrap_err();
    assert!(engine.is_editing());

    engine.toggle_pin("B", "2");
    let second = engine.begin_commit().unwrap();
    assert_ne!(first.seq, second.seq);

    assert!(!engine
        .complete_commit(first, Ok(vec!["A-1".to_string()]))
        .unwrap());
    assert!(engine.is_saving());
    assert!(engine.last_synced().is_empty());

    assert!(engine
        .complete_commit(second, Ok(vec!["A-1".to_string(), "B-2".to_string()]))
        .unwrap());
    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
    assert!(!engine.is_saving());
}

#[tokio::test]
async fn failed_commit_keeps_local_edits() {
    let store = Arc::new(ReadOnlyStore {
        inner: MemoryPinStore::with_pins(COLLECTION, &["A-1"]),
    });
    let mut engine = engine_with(store);
    engine.load().await.unwrap();
    engine.enter_editing();
    engine.toggle_pin("B", "2");

    let err = engine.commit().await.unwrap_err();

    assert!(matches!(err, EngineError::Commit { .. }));
    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
    assert_eq!(engine.last_synced(), ["A-1".to_string()]);
    assert!(engine.is_editing());
    assert!(!engine.is_saving());
    assert!(engine.error().is_some_and(|e| e.contains("read-only")));
}

#[tokio::test]
async fn discard_restores_last_synced_pins() {
    let store = Arc::new(MemoryPinStore::with_pins(COLLECTION, &["A-1", "B-2"]));
    let mut engine = engine_with(store);
    engine.load().await.unwrap();
    engine.enter_editing();

    engine.toggle_pin("C", "3");
    engine.reorder(1, 0);
    engine.toggle_pin("A", "1");
    assert!(engine.has_unsaved_changes());

    engine.discard().await.unwrap();

    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
    assert!(!engine.is_editing());
    assert!(!engine.has_unsaved_changes());
}

#[tokio::test]
async fn discard_while_saving_is_rejected() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    let _ticket = engine.begin_commit().unwrap();

    assert!(matches!(
        engine.discard().await,
        Err(EngineError::CommitInProgress { .. })
    ));
}

#[test]
fn removal_requires_confirmation() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.toggle_pin("B", "2");

    engine.request_removal("A", "1");
    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);

    engine.cancel_removal();
    assert_eq!(keys(&engine), vec!["A-1", "B-2"]);
    assert!(engine.confirm_removal().is_none());

    engine.request_removal("A", "1");
    assert_eq!(engine.confirm_removal().as_deref(), Some("A-1"));
    assert_eq!(keys(&engine), vec!["B-2"]);
}

#[test]
fn confirming_an_already_unpinned_key_does_not_repin() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    engine.toggle_pin("A", "1");
    engine.request_removal("A", "1");
    engine.toggle_pin("A", "1");

    assert!(engine.confirm_removal().is_none());
    assert!(!engine.is_pinned("A-1"));
}

#[tokio::test]
async fn diff_reports_additions_removals_and_reorders() {
    let store = Arc::new(MemoryPinStore::with_pins(COLLECTION, &["A-1", "B-2"]));
    let mut engine = engine_with(store);
    engine.load().await.unwrap();
    assert!(engine.diff().is_empty());

    engine.reorder(1, 0);
    let diff = engine.diff();
    assert!(diff.reordered);
    assert!(diff.added.is_empty() && diff.removed.is_empty());

    engine.toggle_pin("A", "1");
    engine.toggle_pin("C", "3");
    let diff = engine.diff();
    assert_eq!(diff.added, vec!["C-3".to_string()]);
    assert_eq!(diff.removed, vec!["A-1".to_string()]);
    assert!(!diff.reordered);
}

#[tokio::test]
async fn subscribers_see_pin_changes() {
    let mut engine = engine_with(Arc::new(MemoryPinStore::new()));
    let mut rx = engine.subscribe();

    engine.toggle_pin("A", "1");

    assert_eq!(
        rx.recv().await.unwrap(),
        CurationEvent::PinsChanged {
            keys: vec!["A-1".to_string()]
        }
    );
}
