use thiserror::Error;
use vitrine_gateway::GatewayError;
use vitrine_pins::PinStoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A second commit was issued while one is still outstanding.
    #[error("a pin commit is already in progress for collection {collection_id}")]
    CommitInProgress { collection_id: i64 },

    #[error("failed to fetch {resource} for collection {collection_id}: {source}")]
    Fetch {
        resource: &'static str,
        collection_id: i64,
        #[source]
        source: GatewayError,
    },

    #[error("failed to load pins for collection {collection_id}: {source}")]
    PinFetch {
        collection_id: i64,
        #[source]
        source: PinStoreError,
    },

    /// Local pin edits are kept so the operator can retry or discard.
    #[error("failed to save pins for collection {collection_id}: {source}")]
    Commit {
        collection_id: i64,
        #[source]
        source: PinStoreError,
    },
}

impl EngineError {
    /// `true` when the underlying gateway error means the session is gone.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, EngineError::Fetch { source, .. } if source.requires_login())
    }
}
