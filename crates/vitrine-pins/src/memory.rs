use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{PinStore, PinStoreError};

/// In-process pin store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    pins: Mutex<HashMap<i64, Vec<String>>>,
}

impl MemoryPinStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with pins for one collection.
    #[must_use]
    pub fn with_pins(collection_id: i64, keys: &[&str]) -> Self {
        let mut pins = HashMap::new();
        pins.insert(
            collection_id,
            keys.iter().map(|k| (*k).to_owned()).collect(),
        );
        Self {
            pins: Mutex::new(pins),
        }
    }
}

#[async_trait]
impl PinStore for MemoryPinStore {
    async fn get(&self, collection_id: i64) -> Result<Vec<String>, PinStoreError> {
        Ok(self
            .pins
            .lock()
            .await
            .get(&collection_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set(
        &self,
        collection_id: i64,
        keys: &[String],
    ) -> Result<Vec<String>, PinStoreError> {
        self.pins.lock().await.insert(collection_id, keys.to_vec());
        Ok(keys.to_vec())
    }
}
