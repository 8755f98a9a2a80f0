//! Shared-domain cookie handling for cross-subdomain session visibility.
//!
//! The durable store is authoritative for session payloads (they routinely
//! exceed per-cookie size limits); the cookie written here exists solely so
//! sibling subdomains of the shared parent domain can detect the session.
//! Writes go through a [`CookieSink`], the ambient cookie surface of the
//! embedding — a browser's cookie store, an HTTP jar, or the in-memory
//! implementation provided here.

use cookie::{Cookie, SameSite};
use std::collections::HashMap;
use std::sync::RwLock;
use time::Duration;

/// Ambient cookie surface the storage adapter writes through.
///
/// Implementations are responsible for any wire-level encoding their surface
/// requires; they receive fully built cookies with all attributes set.
pub trait CookieSink: Send + Sync {
    /// Applies a cookie to the ambient store.
    ///
    /// A cookie with a non-positive max-age removes any existing cookie of
    /// the same name.
    fn apply(&self, cookie: &Cookie<'_>);

    /// Returns the current value of the named cookie, if present.
    fn get(&self, name: &str) -> Option<String>;
}

/// Builds the shared session cookie with the deployment's attributes.
///
/// Attributes: path `/`, the configured parent domain, a multi-day max-age,
/// `SameSite=Lax`, and the Secure flag per configuration.
#[must_use]
pub fn shared_cookie(
    name: &str,
    value: &str,
    domain: &str,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .domain(domain.to_string())
        .max_age(max_age)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Builds a cookie that expires the named cookie on the same domain/path.
#[must_use]
pub fn expired_cookie(name: &str, domain: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .domain(domain.to_string())
        .max_age(Duration::ZERO)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// In-process cookie store.
///
/// Stands in for the ambient cookie surface in tests and native embeddings
/// that have no real one.
#[derive(Debug, Default)]
pub struct InMemoryCookies {
    cookies: RwLock<HashMap<String, String>>,
}

impl InMemoryCookies {
    /// Creates an empty cookie store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no cookies are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.cookies.read() {
            Ok(guard) => guard.is_empty(),
            Err(poisoned) => poisoned.into_inner().is_empty(),
        }
    }
}

impl CookieSink for InMemoryCookies {
    fn apply(&self, cookie: &Cookie<'_>) {
        let mut cookies = match self.cookies.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let removal = cookie.max_age().is_some_and(|age| age <= Duration::ZERO);
        if removal {
            cookies.remove(cookie.name());
        } else {
            cookies.insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }

    fn get(&self, name: &str) -> Option<String> {
        let cookies = match self.cookies.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cookies.get(name).cloned()
    }
}
