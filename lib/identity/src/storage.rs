//! Dual-mode session storage adapter.
//!
//! The identity client persists sessions through the [`SessionStorage`]
//! contract. Two deployment variants exist:
//!
//! - durable-only: sessions live in the durable store and nothing else;
//! - SSO: every write is additionally mirrored into a cookie scoped to the
//!   shared parent domain, so sibling subdomains can detect the session.
//!
//! The variant is selected by [`StorageConfig::cookie_domain`]; the two are
//! never mixed within one adapter. The durable store is always written first
//! and always preferred on read. The two writes are not transactional: a
//! failure between them can leave the cookie stale, tolerated because the
//! cookie is advisory only.

use crate::config::StorageConfig;
use crate::cookies::{CookieSink, expired_cookie, shared_cookie};
use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use time::Duration;

/// Key/value persistence contract the identity client calls internally.
pub trait SessionStorage: Send + Sync {
    /// Returns the stored value for `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process durable store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed durable store for native embeddings.
///
/// Entries are kept as a single JSON object on disk, read and rewritten
/// whole on each operation; session payloads are small enough that this
/// stays cheap.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a store backed by the given file. The file is created on the
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StorageError::Io {
                reason: e.to_string(),
            }),
        }
    }

    fn store(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries).map_err(|e| StorageError::Serialization {
            reason: e.to_string(),
        })?;
        fs::write(&self.path, raw).map_err(|e| StorageError::Io {
            reason: e.to_string(),
        })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.remove(key);
        self.store(&entries)
    }
}

/// Cookie half of the SSO variant.
struct CookieMirror {
    sink: Arc<dyn CookieSink>,
    domain: String,
    fixed_name: Option<String>,
    max_age: Duration,
    secure: bool,
}

impl CookieMirror {
    fn cookie_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.fixed_name.as_deref().unwrap_or(key)
    }

    fn store(&self, key: &str, value: &str) {
        self.sink.apply(&shared_cookie(
            self.cookie_name(key),
            value,
            &self.domain,
            self.max_age,
            self.secure,
        ));
    }

    fn load(&self, key: &str) -> Option<String> {
        self.sink.get(self.cookie_name(key))
    }

    fn clear(&self, key: &str) {
        self.sink
            .apply(&expired_cookie(self.cookie_name(key), &self.domain, self.secure));
    }
}

/// Storage adapter combining a durable store with optional cookie mirroring.
///
/// Writes apply to both stores from the caller's point of view; reads prefer
/// the durable store and fall back to the cookie.
pub struct MirroredStorage {
    durable: Box<dyn SessionStorage>,
    mirror: Option<CookieMirror>,
}

impl MirroredStorage {
    /// Creates the durable-only variant. No cookie is ever written or read.
    #[must_use]
    pub fn durable_only(durable: Box<dyn SessionStorage>) -> Self {
        Self {
            durable,
            mirror: None,
        }
    }

    /// Creates the adapter variant selected by the configuration.
    ///
    /// With `cookie_domain` unset this is exactly [`Self::durable_only`];
    /// the sink is never touched.
    #[must_use]
    pub fn from_config(
        durable: Box<dyn SessionStorage>,
        config: &StorageConfig,
        sink: Arc<dyn CookieSink>,
    ) -> Self {
        let mirror = config.cookie_domain.as_ref().map(|domain| CookieMirror {
            sink,
            domain: domain.clone(),
            fixed_name: config.cookie_name.clone(),
            max_age: Duration::days(config.cookie_max_age_days),
            secure: config.secure_cookies,
        });
        Self { durable, mirror }
    }

    /// Returns true if this adapter mirrors writes into a shared cookie.
    #[must_use]
    pub fn mirrors_to_cookie(&self) -> bool {
        self.mirror.is_some()
    }
}

impl SessionStorage for MirroredStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(value) = self.durable.get(key)? {
            return Ok(Some(value));
        }
        Ok(self.mirror.as_ref().and_then(|mirror| mirror.load(key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.durable.set(key, value)?;
        if let Some(mirror) = &self.mirror {
            mirror.store(key, value);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.durable.remove(key)?;
        if let Some(mirror) = &self.mirror {
            mirror.clear(key);
        }
        Ok(())
    }
}
