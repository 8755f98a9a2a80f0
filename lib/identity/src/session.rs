//! Session types for authenticated users.
//!
//! A session is the provider-issued proof of authentication: the token pair,
//! expiry metadata, and the user it belongs to. The identity client persists
//! sessions through the storage adapter and refreshes them via the provider's
//! refresh-token grant.

use chrono::{DateTime, Duration, Utc};
use gangway_core::UserId;
use serde::{Deserialize, Serialize};

/// Sessions within this margin of expiry are refreshed proactively, so a
/// token handed to a sibling property is never already stale.
const REFRESH_MARGIN_SECS: i64 = 60;

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-issued user identifier.
    pub id: UserId,
    /// The user's email address, when the provider reports one.
    pub email: Option<String>,
}

impl AuthUser {
    /// Creates a user record from provider-reported fields.
    #[must_use]
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Provider-issued proof of authentication.
///
/// Created on successful credential or magic-link verification, refreshed via
/// the refresh-token grant, destroyed on sign-out or expiry. The serialized
/// form is what the storage adapter persists and what sibling subdomains
/// detect through the shared cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for API calls.
    access_token: String,
    /// Token exchanged for a fresh pair when the session nears expiry.
    refresh_token: String,
    /// Access-token lifetime in seconds, as issued.
    expires_in: u64,
    /// Token type, typically "bearer".
    token_type: String,
    /// Absolute expiry instant, computed at issue time.
    expires_at: DateTime<Utc>,
    /// The authenticated user.
    user: AuthUser,
}

impl Session {
    /// Creates a session from a freshly issued token pair.
    ///
    /// The absolute expiry is computed from `expires_in` at call time.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: u64,
        token_type: String,
        user: AuthUser,
    ) -> Self {
        let expires_at = Utc::now() + Duration::seconds(expires_in as i64);
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type,
            expires_at,
            user,
        }
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Returns the issued access-token lifetime in seconds.
    #[must_use]
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// Returns the token type.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns the absolute expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the authenticated user.
    #[must_use]
    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the session is expired or within the refresh margin.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthUser {
        AuthUser::new(UserId::from("user-1"), Some("alice@example.com".to_string()))
    }

    fn session_with_lifetime(expires_in: u64) -> Session {
        Session::new(
            "access-token".to_string(),
            "refresh-token".to_string(),
            expires_in,
            "bearer".to_string(),
            test_user(),
        )
    }

    #[test]
    fn new_session_has_correct_fields() {
        let before = Utc::now();
        let session = session_with_lifetime(3600);
        let after = Utc::now();

        assert_eq!(session.access_token(), "access-token");
        assert_eq!(session.refresh_token(), "refresh-token");
        assert_eq!(session.expires_in(), 3600);
        assert_eq!(session.token_type(), "bearer");
        assert_eq!(session.user_id().as_str(), "user-1");
        assert!(session.expires_at() >= before + Duration::seconds(3600));
        assert!(session.expires_at() <= after + Duration::seconds(3600));
    }

    #[test]
    fn long_lived_session_is_not_expired() {
        let session = session_with_lifetime(3600);
        assert!(!session.is_expired());
        assert!(!session.needs_refresh());
    }

    #[test]
    fn zero_lifetime_session_is_expired() {
        let session = session_with_lifetime(0);
        assert!(session.is_expired());
        assert!(session.needs_refresh());
    }

    #[test]
    fn session_within_margin_needs_refresh_but_is_not_expired() {
        // Expires in 30s: inside the 60s refresh margin, but still valid.
        let session = session_with_lifetime(30);
        assert!(!session.is_expired());
        assert!(session.needs_refresh());
    }

    #[test]
    fn session_serde_roundtrip_preserves_expiry() {
        let session = session_with_lifetime(3600);

        let json = serde_json::to_string(&session).expect("serialize");
        let parsed: Session = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(session, parsed);
        assert_eq!(parsed.expires_at(), session.expires_at());
    }

    #[test]
    fn auth_user_without_email() {
        let user = AuthUser::new(UserId::from("user-2"), None);
        assert_eq!(user.id.as_str(), "user-2");
        assert!(user.email.is_none());
    }
}
