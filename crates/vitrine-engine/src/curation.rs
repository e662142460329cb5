//! Pinned-product curation for a single collection.
//!
//! `pinned_keys` is the ordered source of truth. `pinned_view` is derived from
//! it against the most recent product listing and never edited directly.
//! Keys whose product is absent from the listing stay pinned and are reported
//! by [`CurationEngine::orphaned_keys`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::broadcast;
use vitrine_core::{product_key, Product};
use vitrine_pins::{PinStore, PinStoreError};

use crate::error::EngineError;
use crate::events::{CurationEvent, EventHub};
use crate::removal::RemovalConfirmation;

/// Keys snapshotted when a commit starts. Hand back to
/// [`CurationEngine::complete_commit`] together with the store's reply.
/// Only the ticket of the outstanding commit is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTicket {
    pub seq: u64,
    pub collection_id: i64,
    pub keys: Vec<String>,
}

/// Difference between the local pin list and the last synced one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Same membership, different order.
    pub reordered: bool,
}

impl PinDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.reordered
    }
}

pub struct CurationEngine {
    collection_id: i64,
    store: Arc<dyn PinStore>,
    pinned_keys: Vec<String>,
    pinned_view: Vec<Product>,
    listing: Vec<Product>,
    last_synced: Vec<String>,
    editing: bool,
    saving: bool,
    commit_seq: u64,
    loading: bool,
    error: Option<String>,
    removal: RemovalConfirmation,
    events: EventHub<CurationEvent>,
}

impl std::fmt::Debug for CurationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurationEngine")
            .field("collection_id", &self.collection_id)
            .field("pinned_keys", &self.pinned_keys)
            .field("editing", &self.editing)
            .field("saving", &self.saving)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl CurationEngine {
    #[must_use]
    pub fn new(collection_id: i64, store: Arc<dyn PinStore>) -> Self {
        Self {
            collection_id,
            store,
            pinned_keys: Vec::new(),
            pinned_view: Vec::new(),
            listing: Vec::new(),
            last_synced: Vec::new(),
            editing: false,
            saving: false,
            commit_seq: 0,
            loading: false,
            error: None,
            removal: RemovalConfirmation::new(),
            events: EventHub::default(),
        }
    }

    #[must_use]
    pub fn collection_id(&self) -> i64 {
        self.collection_id
    }

    #[must_use]
    pub fn pinned_keys(&self) -> &[String] {
        &self.pinned_keys
    }

    #[must_use]
    pub fn pinned_view(&self) -> &[Product] {
        &self.pinned_view
    }

    #[must_use]
    pub fn last_synced(&self) -> &[String] {
        &self.last_synced
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn removal(&self) -> &RemovalConfirmation {
        &self.removal
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CurationEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn is_pinned(&self, key: &str) -> bool {
        self.pinned_keys.iter().any(|k| k == key)
    }

    /// Pinned keys with no matching product in the current listing.
    #[must_use]
    pub fn orphaned_keys(&self) -> Vec<&str> {
        let listed: HashSet<String> = self.listing.iter().map(Product::key).collect();
        self.pinned_keys
            .iter()
            .filter(|k| !listed.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// `true` when local edits differ from the last fetched or committed list.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.pinned_keys != self.last_synced
    }

    #[must_use]
    pub fn diff(&self) -> PinDiff {
        let local: HashSet<&str> = self.pinned_keys.iter().map(String::as_str).collect();
        let synced: HashSet<&str> = self.last_synced.iter().map(String::as_str).collect();
        let added: Vec<String> = self
            .pinned_keys
            .iter()
            .filter(|k| !synced.contains(k.as_str()))
            .cloned()
            .collect();
        let removed: Vec<String> = self
            .last_synced
            .iter()
            .filter(|k| !local.contains(k.as_str()))
            .cloned()
            .collect();
        let reordered =
            added.is_empty() && removed.is_empty() && self.pinned_keys != self.last_synced;
        PinDiff {
            added,
            removed,
            reordered,
        }
    }

    /// Fetches the stored pins for this collection and adopts them as both
    /// the local and the last synced list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PinFetch`] when the store read fails. The
    /// message is also kept in [`CurationEngine::error`].
    pub async fn load(&mut self) -> Result<(), EngineError> {
        self.loading = true;
        self.error = None;
        let store = Arc::clone(&self.store);
        let result = store.get(self.collection_id).await;
        self.loading = false;

        match result {
            Ok(keys) => {
                self.adopt_synced(keys);
                tracing::debug!(
                    collection_id = self.collection_id,
                    pins = self.pinned_keys.len(),
                    "pins loaded"
                );
                self.emit_pins_changed();
                Ok(())
            }
            Err(source) => {
                self.fail(&source.to_string());
                Err(EngineError::PinFetch {
                    collection_id: self.collection_id,
                    source,
                })
            }
        }
    }

    pub fn enter_editing(&mut self) {
        if !self.editing {
            self.editing = true;
            self.events.emit(CurationEvent::EditingChanged(true));
        }
    }

    /// Pins the variant if it is not pinned (appending it), unpins it
    /// otherwise. Returns whether the variant is pinned afterwards.
    pub fn toggle_pin(&mut self, product_code: &str, color_code: &str) -> bool {
        let key = product_key(product_code, color_code);
        let pinned = if let Some(idx) = self.pinned_keys.iter().position(|k| *k == key) {
            self.pinned_keys.remove(idx);
            false
        } else {
            self.pinned_keys.push(key);
            true
        };
        self.refresh_view();
        self.emit_pins_changed();
        pinned
    }

    /// Drop-target entry point: pins the product only if it is not already
    /// pinned. Returns `true` when a pin was added.
    pub fn drop_pin(&mut self, product: &Product) -> bool {
        if self.is_pinned(&product.key()) {
            return false;
        }
        self.toggle_pin(&product.product_code, &product.color_code)
    }

    /// Moves the pin shown at `from` in the pinned view to position `to`.
    ///
    /// Indices address `pinned_view`. The moved key is placed directly after
    /// the key shown at `to` when moving down and directly before it when
    /// moving up, so orphaned keys keep their relative place in
    /// `pinned_keys`. Out-of-range indices and `from == to` are no-ops.
    /// Returns `true` when the order changed.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.pinned_view.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let moving = self.pinned_view[from].key();
        let target = self.pinned_view[to].key();

        let Some(src) = self.pinned_keys.iter().position(|k| *k == moving) else {
            return false;
        };
        let moved = self.pinned_keys.remove(src);
        let Some(dst) = self.pinned_keys.iter().position(|k| *k == target) else {
            self.pinned_keys.insert(src, moved);
            return false;
        };
        let insert_at = if from < to { dst + 1 } else { dst };
        self.pinned_keys.insert(insert_at, moved);

        self.refresh_view();
        self.emit_pins_changed();
        true
    }

    /// Opens the removal confirmation for a pinned variant. A pending
    /// request for another product is replaced.
    pub fn request_removal(&mut self, product_code: &str, color_code: &str) {
        self.removal.request(product_code, color_code);
        self.events.emit(CurationEvent::RemovalRequested {
            key: product_key(product_code, color_code),
        });
    }

    /// Resolves the pending removal. Returns the key that was unpinned, or
    /// `None` when nothing was pending or the key was no longer pinned.
    pub fn confirm_removal(&mut self) -> Option<String> {
        let (product_code, color_code) = self.removal.confirm()?;
        let key = product_key(&product_code, &color_code);
        if !self.is_pinned(&key) {
            tracing::debug!(%key, "removal confirmed for a key that is no longer pinned");
            return None;
        }
        self.toggle_pin(&product_code, &color_code);
        Some(key)
    }

    pub fn cancel_removal(&mut self) {
        if let Some(key) = self.removal.cancel() {
            self.events.emit(CurationEvent::RemovalCancelled { key });
        }
    }

    /// Marks a commit as outstanding and snapshots the keys to persist.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CommitInProgress`] while an earlier commit has
    /// not been completed.
    pub fn begin_commit(&mut self) -> Result<CommitTicket, EngineError> {
        if self.saving {
            return Err(EngineError::CommitInProgress {
                collection_id: self.collection_id,
            });
        }
        self.saving = true;
        self.commit_seq += 1;
        self.error = None;
        self.events.emit(CurationEvent::SavingChanged(true));
        Ok(CommitTicket {
            seq: self.commit_seq,
            collection_id: self.collection_id,
            keys: self.pinned_keys.clone(),
        })
    }

    /// Applies the store's reply to an outstanding commit. On success the
    /// acknowledged list replaces the local one and editing ends. On failure
    /// local edits are kept and editing stays on.
    ///
    /// Returns `Ok(false)` without touching any state when `ticket` is not
    /// the outstanding commit, e.g. a duplicate reply after completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Commit`] carrying the store failure.
    pub fn complete_commit(
        &mut self,
        ticket: CommitTicket,
        result: Result<Vec<String>, PinStoreError>,
    ) -> Result<bool, EngineError> {
        if !self.saving || ticket.seq != self.commit_seq {
            tracing::debug!(
                collection_id = ticket.collection_id,
                seq = ticket.seq,
                outstanding = ?self.saving.then_some(self.commit_seq),
                "discarding reply for a commit that is not outstanding"
            );
            return Ok(false);
        }
        self.saving = false;
        self.events.emit(CurationEvent::SavingChanged(false));

        match result {
            Ok(ack) => {
                tracing::info!(
                    collection_id = ticket.collection_id,
                    pins = ack.len(),
                    "pins committed"
                );
                self.adopt_synced(ack);
                self.editing = false;
                self.events.emit(CurationEvent::EditingChanged(false));
                self.events.emit(CurationEvent::Committed {
                    keys: self.pinned_keys.clone(),
                });
                Ok(true)
            }
            Err(source) => {
                tracing::warn!(
                    collection_id = ticket.collection_id,
                    error = %source,
                    "pin commit failed; keeping local edits"
                );
                self.fail(&source.to_string());
                Err(EngineError::Commit {
                    collection_id: ticket.collection_id,
                    source,
                })
            }
        }
    }

    /// Persists `pinned_keys` through the store and adopts its reply.
    ///
    /// # Errors
    ///
    /// See [`CurationEngine::begin_commit`] and
    /// [`CurationEngine::complete_commit`].
    pub async fn commit(&mut self) -> Result<(), EngineError> {
        let ticket = self.begin_commit()?;
        let store = Arc::clone(&self.store);
        let result = store.set(ticket.collection_id, &ticket.keys).await;
        self.complete_commit(ticket, result).map(|_| ())
    }

    /// Drops local edits by re-reading the store and leaves editing mode.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CommitInProgress`] while saving, or
    /// [`EngineError::PinFetch`] when the store read fails. Local state is
    /// untouched on error.
    pub async fn discard(&mut self) -> Result<(), EngineError> {
        if self.saving {
            return Err(EngineError::CommitInProgress {
                collection_id: self.collection_id,
            });
        }
        let store = Arc::clone(&self.store);
        match store.get(self.collection_id).await {
            Ok(keys) => {
                self.adopt_synced(keys);
                self.removal.cancel();
                self.editing = false;
                self.error = None;
                self.events.emit(CurationEvent::EditingChanged(false));
                self.events.emit(CurationEvent::Discarded {
                    keys: self.pinned_keys.clone(),
                });
                Ok(())
            }
            Err(source) => {
                self.fail(&source.to_string());
                Err(EngineError::PinFetch {
                    collection_id: self.collection_id,
                    source,
                })
            }
        }
    }

    /// Rebuilds `pinned_view` against a new product listing.
    pub fn recompute_view(&mut self, all_products: &[Product]) {
        self.listing = all_products.to_vec();
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let by_key: HashMap<String, &Product> =
            self.listing.iter().map(|p| (p.key(), p)).collect();
        self.pinned_view = self
            .pinned_keys
            .iter()
            .filter_map(|k| by_key.get(k).map(|p| (*p).clone()))
            .collect();
    }

    fn adopt_synced(&mut self, keys: Vec<String>) {
        let keys = dedup_keys(keys);
        self.last_synced.clone_from(&keys);
        self.pinned_keys = keys;
        self.refresh_view();
    }

    fn fail(&mut self, message: &str) {
        self.error = Some(message.to_owned());
        self.events.emit(CurationEvent::Failed {
            message: message.to_owned(),
        });
    }

    fn emit_pins_changed(&self) {
        self.events.emit(CurationEvent::PinsChanged {
            keys: self.pinned_keys.clone(),
        });
    }
}

/// Drops repeated keys, keeping the first occurrence.
fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

#[cfg(test)]
#[path = "curation_test.rs"]
mod tests;
