//! Strongly-typed ID types for domain entities.
//!
//! User identity originates at the external identity provider, so `UserId`
//! wraps the provider-issued opaque identifier string rather than a locally
//! generated value. The provider guarantees uniqueness; gangway never mints
//! user identifiers of its own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a user, as issued by the identity provider.
///
/// The value is opaque to gangway: it is carried through profile lookups and
/// storage without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user ID from a provider-issued identifier.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_display() {
        let id = UserId::new("5f1b7c2e-9d7a-4b64-8f31-2d9c0a4e6b11".to_string());
        assert_eq!(id.to_string(), "5f1b7c2e-9d7a-4b64-8f31-2d9c0a4e6b11");
    }

    #[test]
    fn user_id_from_string() {
        let id: UserId = "user-123".to_string().into();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_from_str() {
        let id: UserId = "user-123".into();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_equality() {
        let a = UserId::from("abc");
        let b = UserId::from("abc");
        assert_eq!(a, b);
    }

    #[test]
    fn user_id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(UserId::from("a"));
        set.insert(UserId::from("b"));
        set.insert(UserId::from("a"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn user_id_serde_is_transparent() {
        let id = UserId::from("abc");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc\"");

        let parsed: UserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
