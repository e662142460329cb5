//! Two-state confirmation step guarding pin removal.

use vitrine_core::product_key;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemovalState {
    #[default]
    Idle,
    PendingConfirmation {
        product_code: String,
        color_code: String,
    },
}

/// At most one pending request; a new request replaces the pending one.
#[derive(Debug, Clone, Default)]
pub struct RemovalConfirmation {
    state: RemovalState,
}

impl RemovalConfirmation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &RemovalState {
        &self.state
    }

    /// Key of the pending product, if any.
    #[must_use]
    pub fn pending_key(&self) -> Option<String> {
        match &self.state {
            RemovalState::Idle => None,
            RemovalState::PendingConfirmation {
                product_code,
                color_code,
            } => Some(product_key(product_code, color_code)),
        }
    }

    pub fn request(&mut self, product_code: &str, color_code: &str) {
        self.state = RemovalState::PendingConfirmation {
            product_code: product_code.to_owned(),
            color_code: color_code.to_owned(),
        };
    }

    /// Returns to `Idle` and hands back the `(product_code, color_code)` the
    /// caller must unpin. `None` when nothing was pending.
    pub fn confirm(&mut self) -> Option<(String, String)> {
        match std::mem::take(&mut self.state) {
            RemovalState::Idle => None,
            RemovalState::PendingConfirmation {
                product_code,
                color_code,
            } => Some((product_code, color_code)),
        }
    }

    /// Returns to `Idle` without side effects; yields the abandoned key.
    pub fn cancel(&mut self) -> Option<String> {
        let key = self.pending_key();
        self.state = RemovalState::Idle;
        key
    }
}
