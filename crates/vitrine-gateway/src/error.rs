use thiserror::Error;

/// Errors returned by the remote collection gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response envelope carried no `data` payload.
    #[error("empty payload for {context}")]
    EmptyPayload { context: String },

    /// HTTP 401 with no session to refresh, or still 401 after a refresh.
    #[error("unauthorized request to {url}")]
    Unauthorized { url: String },

    /// The login endpoint answered but did not accept the credentials.
    #[error("login rejected: {message}")]
    AuthRejected { message: String },

    /// The refresh-token exchange failed; the session has been cleared.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    #[error("invalid API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl GatewayError {
    /// `true` when the caller must log in again before retrying.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            GatewayError::SessionExpired { .. } | GatewayError::Unauthorized { .. }
        )
    }
}
