//! Profile store access.
//!
//! The profile store is an external collaborator holding one record per
//! user: the assigned role and an optional service-access descriptor. It is
//! read once per redirect decision and is read-only from gangway's
//! perspective, with one exception — a directory record written alongside a
//! newly created account.

use crate::error::ProfileError;
use async_trait::async_trait;
use gangway_core::UserId;
use gangway_identity::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Role and service-access descriptor for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Coarse authorization category; absent when never assigned.
    #[serde(default)]
    pub role: Option<String>,
    /// Optional per-service access descriptor, opaque to gangway.
    #[serde(default)]
    pub service_access: Option<serde_json::Value>,
}

/// Read-only role lookup keyed by provider user id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches role and service access for a user. At most one record.
    ///
    /// The caller's access token is forwarded when available so row-level
    /// policies on the store see the authenticated user.
    async fn fetch(
        &self,
        user_id: &UserId,
        access_token: Option<&str>,
    ) -> Result<Option<UserProfile>, ProfileError>;
}

/// Directory record created alongside a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    /// Provider-issued user id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Whether magic-link sign-in is enabled for the account.
    pub magic_link_enabled: bool,
    /// Whether password sign-in is enabled for the account.
    pub password_enabled: bool,
}

impl CustomerRecord {
    /// Creates a record with both sign-in methods enabled.
    #[must_use]
    pub fn new(id: UserId, email: String) -> Self {
        Self {
            id,
            email,
            magic_link_enabled: true,
            password_enabled: true,
        }
    }
}

/// Registration of customer directory records.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Registers the directory record for a newly created account.
    async fn register(&self, record: &CustomerRecord) -> Result<(), ProfileError>;
}

/// Profile store backed by the provider's data REST surface.
///
/// Profiles live in the `user_profiles` relation, directory records in
/// `customer_accounts`, both under `{base}/rest/v1`.
pub struct RestProfileStore {
    http: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl RestProfileStore {
    /// Creates a store client against the same backend as the identity
    /// provider.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProfileError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProfileError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            publishable_key: config.publishable_key().to_string(),
        })
    }

    fn rest_url(&self, relation: &str) -> String {
        format!("{}/rest/v1/{relation}", self.base_url)
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn fetch(
        &self,
        user_id: &UserId,
        access_token: Option<&str>,
    ) -> Result<Option<UserProfile>, ProfileError> {
        let filter = format!("eq.{}", user_id.as_str());
        let response = self
            .http
            .get(self.rest_url("user_profiles"))
            .query(&[
                ("user_id", filter.as_str()),
                ("select", "role,service_access"),
                ("limit", "1"),
            ])
            .header("apikey", &self.publishable_key)
            .bearer_auth(access_token.unwrap_or(&self.publishable_key))
            .send()
            .await
            .map_err(|e| ProfileError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProfileError::Query { status, message });
        }

        let mut rows: Vec<UserProfile> =
            response
                .json()
                .await
                .map_err(|e| ProfileError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        if rows.len() > 1 {
            return Err(ProfileError::InvalidResponse {
                reason: format!("expected at most one profile, got {}", rows.len()),
            });
        }
        Ok(rows.pop())
    }
}

#[async_trait]
impl CustomerDirectory for RestProfileStore {
    async fn register(&self, record: &CustomerRecord) -> Result<(), ProfileError> {
        let response = self
            .http
            .post(self.rest_url("customer_accounts"))
            .header("apikey", &self.publishable_key)
            .bearer_auth(&self.publishable_key)
            .json(record)
            .send()
            .await
            .map_err(|e| ProfileError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProfileError::Query { status, message });
        }
        Ok(())
    }
}
