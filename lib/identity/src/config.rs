//! Identity-provider and storage configuration.
//!
//! Fields with defaults can be omitted when loading from environment
//! variables.

use serde::{Deserialize, Serialize};

/// Configuration for the external identity provider.
///
/// The provider exposes its authentication operations under
/// `{base_url}/auth/v1` and its data operations under `{base_url}/rest/v1`;
/// all requests carry the publishable API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the identity backend (e.g., "https://project.example.co").
    base_url: String,
    /// The publishable (anonymous) API key sent with every request.
    publishable_key: String,
    /// Storage key under which the session is persisted.
    /// Default: "gw-auth-token"
    #[serde(default = "default_storage_key")]
    storage_key: String,
    /// Settle-poll behavior for redirect-based auth callbacks.
    #[serde(default)]
    settle: SettleConfig,
}

fn default_storage_key() -> String {
    "gw-auth-token".to_string()
}

impl ProviderConfig {
    /// Creates a provider configuration with defaults for optional fields.
    #[must_use]
    pub fn new(base_url: String, publishable_key: String) -> Self {
        Self {
            base_url,
            publishable_key,
            storage_key: default_storage_key(),
            settle: SettleConfig::default(),
        }
    }

    /// Returns the provider base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the publishable API key.
    #[must_use]
    pub fn publishable_key(&self) -> &str {
        &self.publishable_key
    }

    /// Returns the storage key for the persisted session.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Returns the settle-poll configuration.
    #[must_use]
    pub fn settle(&self) -> &SettleConfig {
        &self.settle
    }

    /// Overrides the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: String) -> Self {
        self.storage_key = key;
        self
    }

    /// Overrides the settle-poll configuration.
    #[must_use]
    pub fn with_settle(mut self, settle: SettleConfig) -> Self {
        self.settle = settle;
        self
    }
}

/// Bounded-poll behavior while a redirect-based auth callback settles.
///
/// The provider may process a callback asynchronously, so the first session
/// check after landing on the page can race it. The session query polls at
/// `poll_interval_ms` until `max_wait_ms` has elapsed. This bounds the
/// latency of the known race; it does not eliminate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Interval between session checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum total time to wait for a session, in milliseconds.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_wait_ms() -> u64 {
    2000
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

/// Storage-adapter configuration.
///
/// `cookie_domain` selects the deployment variant: when unset, sessions live
/// only in the durable store and no cookie is ever written; when set, every
/// write is mirrored into a cookie scoped to that (parent) domain so sibling
/// subdomains can detect the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Parent domain for the shared session cookie (e.g., ".example.com").
    /// Unset disables cookie mirroring entirely.
    #[serde(default)]
    pub cookie_domain: Option<String>,

    /// Fixed cookie name for the SSO variant. When unset, the storage key is
    /// used as the cookie name.
    #[serde(default)]
    pub cookie_name: Option<String>,

    /// Cookie lifetime in days.
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_cookie_max_age_days() -> i64 {
    7
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cookie_domain: None,
            cookie_name: None,
            cookie_max_age_days: default_cookie_max_age_days(),
            secure_cookies: default_secure_cookies(),
        }
    }
}
