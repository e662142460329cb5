use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinStoreError {
    #[error("I/O error on pin store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pin store {path} is not valid JSON: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize pin store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored value under a collection key is not an array of strings.
    #[error("malformed entry {key} in pin store")]
    MalformedEntry { key: String },
}
