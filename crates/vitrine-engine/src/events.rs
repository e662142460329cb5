//! Change notifications for the presentation layer.
//!
//! Every engine owns an [`EventHub`] backed by a `tokio::sync::broadcast`
//! channel. Emitting with no subscribers is not an error; slow subscribers
//! observe `RecvError::Lagged` and should re-read engine state.

use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EventHub<E> {
    tx: broadcast::Sender<E>,
}

impl<E: Clone> EventHub<E> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: E) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<E: Clone> Default for EventHub<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurationEvent {
    PinsChanged { keys: Vec<String> },
    EditingChanged(bool),
    SavingChanged(bool),
    RemovalRequested { key: String },
    RemovalCancelled { key: String },
    Committed { keys: Vec<String> },
    Discarded { keys: Vec<String> },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    DefinitionsLoaded { count: usize },
    SelectionChanged,
    DraftChanged,
    Applied { lines: Vec<String> },
    Cleared,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Loading { page: u32 },
    Loaded { page: u32, count: usize, total: u64 },
    StaleDiscarded { seq: u64 },
    Failed { message: String },
}
