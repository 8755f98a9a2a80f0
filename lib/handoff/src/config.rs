//! Deployment configuration.
//!
//! This module composes the per-crate configurations into one strongly-typed
//! deployment config, loaded via the `config` crate from environment
//! variables.
//!
//! See [`ProviderConfig`](gangway_identity::ProviderConfig) and
//! [`StorageConfig`](gangway_identity::StorageConfig) for the identity-side
//! settings.

use crate::bridge::HandoffMode;
use crate::router::Destinations;
use gangway_identity::{ProviderConfig, StorageConfig};
use serde::Deserialize;

/// Deployment configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct GangwayConfig {
    /// Identity-provider connection.
    pub provider: ProviderConfig,

    /// Session storage variant (durable-only vs cookie-mirroring SSO).
    #[serde(default)]
    pub storage: StorageConfig,

    /// Destination base URLs per role.
    pub destinations: Destinations,

    /// Redirect and handoff behavior.
    pub handoff: HandoffConfig,
}

/// Redirect and handoff configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    /// Fragment encoding mode. Fixed per deployment.
    #[serde(default)]
    pub mode: HandoffMode,

    /// Absolute URL of the sign-in page; verification, magic-link, and
    /// recovery emails land the user here.
    pub login_url: String,
}

impl GangwayConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_environment() {
        temp_env::with_vars(
            [
                ("PROVIDER__BASE_URL", Some("https://project.example.co")),
                ("PROVIDER__PUBLISHABLE_KEY", Some("pk")),
                (
                    "DESTINATIONS__PORTAL_URL",
                    Some("https://portal.example.com/portal.html"),
                ),
                (
                    "DESTINATIONS__OPERATIONS_URL",
                    Some("https://ops.example.com"),
                ),
                (
                    "HANDOFF__LOGIN_URL",
                    Some("https://login.example.com/login.html"),
                ),
            ],
            || {
                let config = GangwayConfig::from_env().expect("config");

                assert_eq!(config.provider.base_url(), "https://project.example.co");
                assert_eq!(
                    config.destinations.portal_url(),
                    "https://portal.example.com/portal.html"
                );
                // Defaults: durable-only storage, recovery-mode fragments.
                assert!(config.storage.cookie_domain.is_none());
                assert_eq!(config.handoff.mode, HandoffMode::Recovery);
            },
        );
    }

    #[test]
    fn sso_variant_from_environment() {
        temp_env::with_vars(
            [
                ("PROVIDER__BASE_URL", Some("https://project.example.co")),
                ("PROVIDER__PUBLISHABLE_KEY", Some("pk")),
                ("STORAGE__COOKIE_DOMAIN", Some("example.com")),
                ("STORAGE__COOKIE_NAME", Some("gw-session")),
                ("HANDOFF__MODE", Some("plain")),
                (
                    "DESTINATIONS__PORTAL_URL",
                    Some("https://portal.example.com/portal.html"),
                ),
                (
                    "DESTINATIONS__OPERATIONS_URL",
                    Some("https://ops.example.com"),
                ),
                (
                    "HANDOFF__LOGIN_URL",
                    Some("https://login.example.com/login.html"),
                ),
            ],
            || {
                let config = GangwayConfig::from_env().expect("config");

                assert_eq!(config.storage.cookie_domain.as_deref(), Some("example.com"));
                assert_eq!(config.storage.cookie_name.as_deref(), Some("gw-session"));
                assert_eq!(config.handoff.mode, HandoffMode::Plain);
            },
        );
    }

    #[test]
    fn missing_required_fields_is_an_error() {
        temp_env::with_vars(
            [("PROVIDER__BASE_URL", Some("https://project.example.co"))],
            || {
                assert!(GangwayConfig::from_env().is_err());
            },
        );
    }
}
