//! REST client for the identity provider.
//!
//! Talks to the provider's authentication surface under `{base}/auth/v1`:
//! the password and refresh-token grants, sign-up, magic-link and recovery
//! emails, and sign-out. Sessions are persisted through the storage adapter
//! the client is constructed with.
//!
//! The client is constructed explicitly and injected wherever it is needed;
//! it holds no global state.

use crate::config::ProviderConfig;
use crate::error::IdentityError;
use crate::provider::AuthProvider;
use crate::session::{AuthUser, Session};
use crate::storage::SessionStorage;
use async_trait::async_trait;
use gangway_core::UserId;
use rootcause::prelude::Report;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the external identity provider.
pub struct IdentityClient {
    http: reqwest::Client,
    config: ProviderConfig,
    storage: Arc<dyn SessionStorage>,
}

/// Token-grant response from the provider.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    token_type: String,
    user: WireUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session::new(
            self.access_token,
            self.refresh_token,
            self.expires_in,
            self.token_type,
            self.user.into_auth_user(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl WireUser {
    fn into_auth_user(self) -> AuthUser {
        AuthUser::new(UserId::new(self.id), self.email)
    }
}

/// Sign-up response. Depending on confirmation settings the provider
/// returns either the bare user object or a session wrapping one.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
}

fn signup_user(body: SignUpResponse) -> Result<AuthUser, IdentityError> {
    if let Some(user) = body.user {
        return Ok(user.into_auth_user());
    }
    match body.id {
        Some(id) => Ok(AuthUser::new(UserId::new(id), body.email)),
        None => Err(IdentityError::InvalidResponse {
            reason: "sign-up response carried no user".to_string(),
        }),
    }
}

/// Pulls a human-readable message out of a provider error body.
fn extract_message(body: &serde_json::Value) -> Option<String> {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl IdentityClient {
    /// Creates a client for the configured provider.
    pub fn new(
        config: ProviderConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, Report<IdentityError>> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| IdentityError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            config,
            storage,
        })
    }

    /// Returns the provider configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn auth_url(&self, path: &str) -> String {
        format!(
            "{}/auth/v1{path}",
            self.config.base_url().trim_end_matches('/')
        )
    }

    async fn post_auth(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        self.http
            .post(self.auth_url(path))
            .query(query)
            .header("apikey", self.config.publishable_key())
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport {
                reason: e.to_string(),
            })
    }

    async fn provider_error(response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| extract_message(&body))
            .unwrap_or_else(|| format!("request failed with status {status}"));
        IdentityError::Provider { status, message }
    }

    /// Exchanges a refresh token for a fresh session. Does not persist.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let response = self
            .post_auth(
                "/token",
                &[("grant_type", "refresh_token")],
                self.config.publishable_key(),
                json!({ "refresh_token": refresh_token }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| IdentityError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        Ok(token.into_session())
    }

    fn persist(&self, session: &Session) -> Result<(), IdentityError> {
        let raw = serde_json::to_string(session).map_err(|e| IdentityError::Storage {
            reason: e.to_string(),
        })?;
        self.storage.set(self.config.storage_key(), &raw)?;
        Ok(())
    }

    fn stored_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(raw) = self.storage.get(self.config.storage_key())? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "stored session is unreadable, clearing it");
                self.storage.remove(self.config.storage_key())?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AuthProvider for IdentityClient {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response = self
            .post_auth(
                "/token",
                &[("grant_type", "password")],
                self.config.publishable_key(),
                json!({ "email": email, "password": password }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| IdentityError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        let session = token.into_session();
        self.persist(&session)?;
        debug!(user = %session.user_id(), "password sign-in succeeded");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: Option<&str>,
    ) -> Result<AuthUser, IdentityError> {
        let mut query = Vec::new();
        if let Some(redirect) = email_redirect_to {
            query.push(("redirect_to", redirect));
        }

        let response = self
            .post_auth(
                "/signup",
                &query,
                self.config.publishable_key(),
                json!({ "email": email, "password": password }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body: SignUpResponse =
            response
                .json()
                .await
                .map_err(|e| IdentityError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        let user = signup_user(body)?;
        debug!(user = %user.id, "account created");
        Ok(user)
    }

    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut query = Vec::new();
        if let Some(redirect) = redirect_to {
            query.push(("redirect_to", redirect));
        }

        let response = self
            .post_auth(
                "/otp",
                &query,
                self.config.publishable_key(),
                json!({ "email": email, "create_user": true }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut query = Vec::new();
        if let Some(redirect) = redirect_to {
            query.push(("redirect_to", redirect));
        }

        let response = self
            .post_auth(
                "/recover",
                &query,
                self.config.publishable_key(),
                json!({ "email": email }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(session) = self.stored_session()? else {
            return Ok(None);
        };

        if !session.needs_refresh() {
            return Ok(Some(session));
        }

        match self.refresh_session(session.refresh_token()).await {
            Ok(refreshed) => {
                self.persist(&refreshed)?;
                debug!(user = %refreshed.user_id(), "session refreshed");
                Ok(Some(refreshed))
            }
            Err(e) if !session.is_expired() => {
                // Inside the refresh margin but still valid: usable as-is.
                warn!(error = %e, "session refresh failed, keeping current session");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed, treating as signed out");
                self.storage.remove(self.config.storage_key())?;
                Ok(None)
            }
        }
    }

    async fn wait_for_session(&self) -> Result<Option<Session>, IdentityError> {
        let settle = self.config.settle();
        let interval = Duration::from_millis(settle.poll_interval_ms);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(settle.max_wait_ms);

        loop {
            match self.current_session().await {
                Ok(Some(session)) => return Ok(Some(session)),
                Ok(None) => {}
                // The callback may still be settling; keep polling.
                Err(e) => warn!(error = %e, "session check failed while settling"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(interval).await;
        }
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), IdentityError> {
        // Best-effort revocation; local sign-out proceeds regardless.
        if let Some(session) = self.stored_session()? {
            match self
                .post_auth("/logout", &[], session.access_token(), json!({}))
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        status = response.status().as_u16(),
                        "provider sign-out failed"
                    );
                }
                Err(e) => warn!(error = %e, "provider sign-out failed"),
                Ok(_) => {}
            }
        }
        self.storage.remove(self.config.storage_key())?;
        Ok(())
    }
}
