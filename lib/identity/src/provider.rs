//! The identity-provider seam.
//!
//! Gangway never verifies credentials or issues tokens itself; every
//! authentication operation is a black-box request/response against the
//! external provider. This trait is that seam: the concrete REST client
//! implements it, and tests substitute an in-memory fake.

use crate::error::IdentityError;
use crate::session::{AuthUser, Session};
use async_trait::async_trait;

/// Operations of the external identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Signs in with email and password, persisting the resulting session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    /// Creates a new account.
    ///
    /// `email_redirect_to` is where the verification email should land the
    /// user. Depending on provider settings the account may require email
    /// confirmation before its first session.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: Option<&str>,
    ) -> Result<AuthUser, IdentityError>;

    /// Requests a magic-link (one-time passwordless) sign-in email.
    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError>;

    /// Requests a password-reset email.
    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError>;

    /// Returns the persisted session, refreshing it if it nears expiry.
    ///
    /// An unreadable or unrefreshable-and-expired stored session is cleared
    /// and reported as `None`.
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Like [`Self::current_session`], but polls for a bounded period.
    ///
    /// Used when the page is the target of a redirect-based auth callback:
    /// the provider may process the callback asynchronously, so the session
    /// can appear shortly after load.
    async fn wait_for_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Revokes the session with the provider (best effort) and clears it
    /// from storage.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}
