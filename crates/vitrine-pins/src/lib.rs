//! Pin store: durable mapping from collection id to an ordered list of
//! pinned product keys.
//!
//! The curation engine only sees the [`PinStore`] trait. Two adapters ship
//! here: [`LocalPinStore`], a JSON document on disk that simulates browser
//! local storage, and [`MemoryPinStore`] for tests and ephemeral sessions.

pub mod error;
pub mod local;
pub mod memory;

use async_trait::async_trait;

pub use error::PinStoreError;
pub use local::LocalPinStore;
pub use memory::MemoryPinStore;

/// Storage key for a collection's pinned products.
#[must_use]
pub fn storage_key(collection_id: i64) -> String {
    format!("pinnedProducts_{collection_id}")
}

/// Backing store for pinned product keys.
///
/// Implementations may be swapped (local, memory, network) without touching
/// the curation engine.
#[async_trait]
pub trait PinStore: Send + Sync {
    /// Returns the pinned keys for a collection, in pin order. An unknown
    /// collection yields an empty list.
    async fn get(&self, collection_id: i64) -> Result<Vec<String>, PinStoreError>;

    /// Replaces the pinned keys for a collection and returns the stored value
    /// as acknowledgement.
    async fn set(
        &self,
        collection_id: i64,
        keys: &[String],
    ) -> Result<Vec<String>, PinStoreError>;
}
