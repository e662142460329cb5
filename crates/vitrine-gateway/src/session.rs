//! Authenticated session issued by the login endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Token pair carried in the `data` of login and refresh responses.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "token")]
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn from_tokens(tokens: TokenPair, issued_at: DateTime<Utc>) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            issued_at,
        }
    }

    /// `true` once `max_age_secs` have elapsed since the session was issued.
    #[must_use]
    pub fn is_expired(&self, max_age_secs: i64, now: DateTime<Utc>) -> bool {
        let max_age = TimeDelta::try_seconds(max_age_secs).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.issued_at) >= max_age
    }

    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
