//! File-backed pin store that mirrors browser local storage.
//!
//! All collections share one JSON object document:
//!
//! ```json
//! { "pinnedProducts_7": ["A100-01", "B200-02"] }
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{storage_key, PinStore, PinStoreError};

#[derive(Debug)]
pub struct LocalPinStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl LocalPinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, PinStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(PinStoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        serde_json::from_slice(&raw).map_err(|e| PinStoreError::Deserialize {
            path: self.path.clone(),
            source: e,
        })
    }

    async fn write_document(&self, doc: &Map<String, Value>) -> Result<(), PinStoreError> {
        let io_err = |source: std::io::Error| PinStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(doc).map_err(PinStoreError::Serialize)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

fn decode_entry(key: &str, value: &Value) -> Result<Vec<String>, PinStoreError> {
    let malformed = || PinStoreError::MalformedEntry {
        key: key.to_owned(),
    };
    value
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|v| v.as_str().map(str::to_owned).ok_or_else(malformed))
        .collect()
}

#[async_trait]
impl PinStore for LocalPinStore {
    async fn get(&self, collection_id: i64) -> Result<Vec<String>, PinStoreError> {
        let key = storage_key(collection_id);
        let doc = self.read_document().await?;
        let keys = match doc.get(&key) {
            Some(value) => decode_entry(&key, value)?,
            None => Vec::new(),
        };
        tracing::debug!(
            collection_id,
            count = keys.len(),
            path = %self.path.display(),
            "loaded pins"
        );
        Ok(keys)
    }

    async fn set(
        &self,
        collection_id: i64,
        keys: &[String],
    ) -> Result<Vec<String>, PinStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(
            storage_key(collection_id),
            Value::Array(keys.iter().cloned().map(Value::String).collect()),
        );
        self.write_document(&doc).await?;
        tracing::info!(
            collection_id,
            count = keys.len(),
            path = %self.path.display(),
            "saved pins"
        );
        Ok(keys.to_vec())
    }
}
