//! Identity-provider client and session persistence for gangway.
//!
//! This crate provides:
//! - The [`AuthProvider`] seam and its REST implementation
//!   ([`IdentityClient`]) for the external identity backend
//! - Session types ([`Session`], [`AuthUser`])
//! - The dual-mode storage adapter ([`MirroredStorage`]) persisting sessions
//!   to a durable store, optionally mirrored into a shared-domain cookie for
//!   cross-subdomain SSO
//!
//! # Persistence Model
//!
//! The provider client persists sessions through the pluggable
//! [`SessionStorage`] contract. The durable store is authoritative — session
//! payloads routinely exceed per-cookie size limits — and the cookie exists
//! solely so sibling subdomains can detect the session.
//!
//! # Example
//!
//! ```no_run
//! use gangway_identity::{
//!     IdentityClient, InMemoryCookies, MemoryStorage, MirroredStorage, ProviderConfig,
//!     StorageConfig,
//! };
//! use std::sync::Arc;
//!
//! let storage_config = StorageConfig {
//!     cookie_domain: Some("example.com".to_string()),
//!     ..StorageConfig::default()
//! };
//! let storage = Arc::new(MirroredStorage::from_config(
//!     Box::new(MemoryStorage::new()),
//!     &storage_config,
//!     Arc::new(InMemoryCookies::new()),
//! ));
//!
//! let config = ProviderConfig::new(
//!     "https://project.example.co".to_string(),
//!     "publishable-key".to_string(),
//! );
//! let client = IdentityClient::new(config, storage).expect("client");
//! # let _ = client;
//! ```

pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod provider;
pub mod session;
pub mod storage;

// Re-export main types at crate root
pub use client::IdentityClient;
pub use config::{ProviderConfig, SettleConfig, StorageConfig};
pub use cookies::{CookieSink, InMemoryCookies, expired_cookie, shared_cookie};
pub use error::{IdentityError, StorageError};
pub use provider::AuthProvider;
pub use session::{AuthUser, Session};
pub use storage::{FileStorage, MemoryStorage, MirroredStorage, SessionStorage};
