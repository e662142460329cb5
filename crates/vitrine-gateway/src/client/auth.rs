//! Login and refresh-token endpoints.

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;

use crate::envelope::ApiEnvelope;
use crate::error::GatewayError;
use crate::session::{Session, TokenPair};

use super::CatalogClient;

const LOGIN_PATH: &str = "Auth/Login";
const REFRESH_PATH: &str = "Auth/RefreshTokenLogin";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl CatalogClient {
    /// Exchanges credentials for a session and installs it on the client.
    ///
    /// The request always carries the bootstrap credential.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::AuthRejected`] when the envelope status is not the
    ///   success sentinel or carries no tokens.
    /// - [`GatewayError::UnexpectedStatus`] when the server answers non-2xx
    ///   with a body that is not an envelope.
    /// - [`GatewayError::Http`] on network failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, GatewayError> {
        let url = self.endpoint(LOGIN_PATH)?;
        let response = self
            .execute(
                Method::POST,
                &url,
                Some(&LoginRequest { username, password }),
                &self.bootstrap_token,
            )
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope = match serde_json::from_str::<ApiEnvelope<TokenPair>>(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Err(e) => {
                return Err(GatewayError::Deserialize {
                    context: "login response".to_owned(),
                    source: e,
                });
            }
        };

        if !envelope.is_login_success() {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "login failed".to_owned());
            tracing::warn!(username, %message, "login rejected");
            return Err(GatewayError::AuthRejected { message });
        }

        let tokens = envelope.data.ok_or_else(|| GatewayError::AuthRejected {
            message: "login response carried no tokens".to_owned(),
        })?;
        let session = Session::from_tokens(tokens, Utc::now());
        self.set_session(Some(session.clone())).await;
        tracing::info!(username, "login succeeded");
        Ok(session)
    }

    /// Exchanges the stored refresh token for a new token pair.
    ///
    /// On any failure the session is cleared, so the caller has to log in
    /// again.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionExpired`] when there is no session or
    /// the exchange fails for any reason.
    pub async fn refresh_session(&self) -> Result<Session, GatewayError> {
        let Some(refresh_token) = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
        else {
            return Err(GatewayError::SessionExpired {
                reason: "no session to refresh".to_owned(),
            });
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(tokens) => {
                let session = Session::from_tokens(tokens, Utc::now());
                self.set_session(Some(session.clone())).await;
                tracing::info!("session refreshed");
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh token exchange failed, clearing session");
                self.set_session(None).await;
                Err(GatewayError::SessionExpired {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, GatewayError> {
        let url = self.endpoint(REFRESH_PATH)?;
        let response = self
            .execute(
                Method::POST,
                &url,
                Some(&RefreshRequest { refresh_token }),
                &self.bootstrap_token,
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let text = response.text().await?;
        let envelope: ApiEnvelope<TokenPair> =
            serde_json::from_str(&text).map_err(|e| GatewayError::Deserialize {
                context: "refresh token response".to_owned(),
                source: e,
            })?;
        envelope.data.ok_or_else(|| GatewayError::EmptyPayload {
            context: "refresh token response".to_owned(),
        })
    }
}
