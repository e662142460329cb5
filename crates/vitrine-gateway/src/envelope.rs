//! Response envelope shared by every remote endpoint.
//!
//! The API wraps payloads as `{ "status": <int>, "message": <string|null>,
//! "data": <payload|null> }`. The login endpoint signals success with
//! `status == 0`; the catalog endpoints are judged by HTTP status and the
//! presence of `data`.

use serde::Deserialize;

/// Status value the login endpoint returns on success.
pub const LOGIN_OK_STATUS: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    #[must_use]
    pub fn is_login_success(&self) -> bool {
        self.status == Some(LOGIN_OK_STATUS) && self.data.is_some()
    }
}
