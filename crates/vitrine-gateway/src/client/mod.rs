//! HTTP client for the remote collection API.
//!
//! Owns the authentication header policy: requests made without a session
//! carry the shared bootstrap credential verbatim, requests made with a
//! session carry `Bearer <accessToken>`. A 401 triggers exactly one
//! refresh-token exchange and one replay of the request. Nothing else is
//! retried.

mod auth;
mod collections;

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::envelope::ApiEnvelope;
use crate::error::GatewayError;
use crate::session::Session;

/// Client for the remote collection API.
///
/// Use [`CatalogClient::new`] with an explicit base URL (production or a
/// wiremock server in tests) or [`CatalogClient::from_config`].
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    bootstrap_token: String,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("bootstrap_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Creates a client with the given base URL, bootstrap credential,
    /// timeout, and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GatewayError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        bootstrap_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| GatewayError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            bootstrap_token: bootstrap_token.to_owned(),
            session: RwLock::new(None),
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &vitrine_core::AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.api_base_url,
            &config.bootstrap_token,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Returns a clone of the current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Installs (or clears) the session used for subsequent requests.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    /// Tears the session down; later requests fall back to the bootstrap credential.
    pub async fn logout(&self) {
        self.set_session(None).await;
        tracing::info!("session cleared");
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }

    /// `Authorization` header value for the current state.
    async fn authorization(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.bearer(),
            None => self.bootstrap_token.clone(),
        }
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
        authorization: &str,
    ) -> Result<reqwest::Response, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .request(method, url.clone())
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Sends an authenticated request and unwraps the envelope's `data`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unauthorized`] on 401 without a refreshable session,
    ///   or when the replay after a refresh is still 401.
    /// - [`GatewayError::SessionExpired`] when the refresh exchange fails.
    /// - [`GatewayError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GatewayError::Deserialize`] / [`GatewayError::EmptyPayload`] for
    ///   malformed or empty bodies.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: &str,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let authorization = self.authorization().await;
        tracing::debug!(%url, context, "sending API request");

        let mut response = self
            .execute(method.clone(), &url, body, &authorization)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if self.session.read().await.is_none() {
                return Err(GatewayError::Unauthorized {
                    url: url.to_string(),
                });
            }
            tracing::warn!(%url, "access token rejected, refreshing session");
            let refreshed = self.refresh_session().await?;
            response = self
                .execute(method, &url, body, &refreshed.bearer())
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                self.set_session(None).await;
                return Err(GatewayError::Unauthorized {
                    url: url.to_string(),
                });
            }
        }

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), context, "API request failed");
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&text).map_err(|e| GatewayError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        envelope.data.ok_or_else(|| GatewayError::EmptyPayload {
            context: context.to_owned(),
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
