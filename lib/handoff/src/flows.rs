//! Headless sign-in, sign-up, and reset flows.
//!
//! Each flow is the logic behind one form submission, minus the DOM: it
//! calls the identity provider, maps the result to a tagged outcome, and
//! leaves rendering (alerts, button state, the navigation itself) to the
//! embedding UI. Provider-supplied failure messages are passed through
//! verbatim; transport-level failures get a generic fallback.
//!
//! Nothing here retries automatically — every retry is a user resubmitting
//! the form.

use crate::bridge::{RedirectTarget, SessionBridge};
use crate::config::GangwayConfig;
use crate::profile::{CustomerDirectory, CustomerRecord, ProfileStore, RestProfileStore};
use crate::router::RoleRouter;
use gangway_identity::{
    AuthProvider, AuthUser, CookieSink, IdentityClient, IdentityError, MirroredStorage, Session,
    SessionStorage,
};
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{error, warn};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
const MAGIC_LINK_FAILED: &str = "Failed to send magic link. Please try again.";
const RESET_FAILED: &str = "Failed to send reset link. Please try again.";
const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
const SIGNUP_ACCEPTED: &str = "Account created! Please check your email to verify your account.";
const MAGIC_LINK_SENT: &str = "Magic link sent! Check your email to sign in.";
const RESET_SENT: &str = "Password reset link sent! Check your email.";

/// Outcome of a credential sign-in attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Authenticated. The caller proceeds to the redirect path with the
    /// session.
    Success {
        /// The authenticated user.
        user: AuthUser,
        /// Role from the profile store; `None` when the lookup failed or no
        /// role is assigned.
        role: Option<String>,
        /// Service-access descriptor from the profile store.
        service_access: Option<serde_json::Value>,
        /// The established session.
        session: Session,
    },
    /// Rejected. `message` is ready for the inline alert.
    Failure {
        /// User-facing failure message.
        message: String,
    },
}

/// Outcome of the email-sending flows (sign-up, magic link, reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request was accepted; show the success message.
    Accepted { message: String },
    /// The request was rejected; show the message and re-enable the form.
    Rejected { message: String },
}

/// What the entry page should do after its initial session check.
#[derive(Debug)]
pub enum PageLoad {
    /// Navigate to the target. Terminal: nothing further runs on this page.
    Redirect(RedirectTarget),
    /// No session; render the login form.
    ShowLogin,
}

fn user_facing(err: &IdentityError, fallback: &str) -> String {
    err.user_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// The flow stack behind the sign-in pages.
pub struct AuthFlows {
    identity: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    directory: Option<Arc<dyn CustomerDirectory>>,
    bridge: SessionBridge,
    login_url: String,
}

impl AuthFlows {
    /// Creates the flow stack from its collaborators.
    #[must_use]
    pub fn new(
        identity: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        directory: Option<Arc<dyn CustomerDirectory>>,
        bridge: SessionBridge,
        login_url: String,
    ) -> Self {
        Self {
            identity,
            profiles,
            directory,
            bridge,
            login_url,
        }
    }

    /// Builds the full stack from deployment configuration.
    ///
    /// The caller supplies the durable store and the ambient cookie surface;
    /// everything else is wired from the configuration.
    pub fn from_config(
        config: &GangwayConfig,
        durable: Box<dyn SessionStorage>,
        cookies: Arc<dyn CookieSink>,
    ) -> Result<Self, Report<IdentityError>> {
        let storage: Arc<dyn SessionStorage> = Arc::new(MirroredStorage::from_config(
            durable,
            &config.storage,
            cookies,
        ));
        let identity: Arc<dyn AuthProvider> =
            Arc::new(IdentityClient::new(config.provider.clone(), storage)?);

        let rest = Arc::new(RestProfileStore::new(&config.provider).map_err(|e| {
            IdentityError::Configuration {
                reason: e.to_string(),
            }
        })?);
        let profiles: Arc<dyn ProfileStore> = rest.clone();
        let directory: Arc<dyn CustomerDirectory> = rest;

        let bridge = SessionBridge::new(
            RoleRouter::new(config.destinations.clone()),
            profiles.clone(),
            config.handoff.mode,
        );

        Ok(Self::new(
            identity,
            profiles,
            Some(directory),
            bridge,
            config.handoff.login_url.clone(),
        ))
    }

    /// Returns the session bridge.
    #[must_use]
    pub fn bridge(&self) -> &SessionBridge {
        &self.bridge
    }

    /// Signs in with email and password.
    ///
    /// On success the profile is read once; a failed lookup is logged and
    /// leaves `role` empty rather than failing the login.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let session = match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "password sign-in failed");
                return LoginOutcome::Failure {
                    message: user_facing(&e, LOGIN_FAILED),
                };
            }
        };

        let (role, service_access) = match self
            .profiles
            .fetch(session.user_id(), Some(session.access_token()))
            .await
        {
            Ok(Some(profile)) => (profile.role, profile.service_access),
            Ok(None) => (None, None),
            Err(e) => {
                warn!(user = %session.user_id(), error = %e, "profile lookup failed after sign-in");
                (None, None)
            }
        };

        LoginOutcome::Success {
            user: session.user().clone(),
            role,
            service_access,
            session,
        }
    }

    /// Creates a new account.
    ///
    /// The confirmation mismatch check runs locally, before any provider
    /// call. The directory record is best effort: it can be created later,
    /// so its failure does not fail the sign-up.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> SubmitOutcome {
        if password != confirm_password {
            return SubmitOutcome::Rejected {
                message: PASSWORDS_DO_NOT_MATCH.to_string(),
            };
        }

        let user = match self
            .identity
            .sign_up(email, password, Some(&self.login_url))
            .await
        {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "sign-up failed");
                return SubmitOutcome::Rejected {
                    message: user_facing(&e, SIGNUP_FAILED),
                };
            }
        };

        if let Some(directory) = &self.directory {
            let record = CustomerRecord::new(user.id.clone(), email.to_string());
            if let Err(e) = directory.register(&record).await {
                warn!(user = %user.id, error = %e, "customer record creation failed");
            }
        }

        SubmitOutcome::Accepted {
            message: SIGNUP_ACCEPTED.to_string(),
        }
    }

    /// Requests a magic-link sign-in email.
    ///
    /// The link lands the user on the explicit redirect when one was given,
    /// otherwise back on the login page, which completes the handoff.
    pub async fn request_magic_link(
        &self,
        email: &str,
        explicit_redirect: Option<&str>,
    ) -> SubmitOutcome {
        let redirect_to = explicit_redirect
            .filter(|redirect| !redirect.is_empty())
            .unwrap_or(&self.login_url);

        match self.identity.send_magic_link(email, Some(redirect_to)).await {
            Ok(()) => SubmitOutcome::Accepted {
                message: MAGIC_LINK_SENT.to_string(),
            },
            Err(e) => {
                warn!(error = %e, "magic link request failed");
                SubmitOutcome::Rejected {
                    message: user_facing(&e, MAGIC_LINK_FAILED),
                }
            }
        }
    }

    /// Requests a password-reset email landing back on the login page.
    pub async fn request_password_reset(&self, email: &str) -> SubmitOutcome {
        match self
            .identity
            .send_password_reset(email, Some(&self.login_url))
            .await
        {
            Ok(()) => SubmitOutcome::Accepted {
                message: RESET_SENT.to_string(),
            },
            Err(e) => {
                warn!(error = %e, "password reset request failed");
                SubmitOutcome::Rejected {
                    message: user_facing(&e, RESET_FAILED),
                }
            }
        }
    }

    /// Runs the entry-page session check.
    ///
    /// Covers both a returning session and the landing of a redirect-based
    /// auth callback (the session query polls while the callback settles).
    /// Every failure on this path collapses to `ShowLogin` — a transient
    /// error must never strand the user on a blank page.
    pub async fn on_page_load(&self, explicit_redirect: Option<&str>) -> PageLoad {
        let session = match self.identity.wait_for_session().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "session check failed on page load");
                None
            }
        };

        match session {
            Some(session) => PageLoad::Redirect(
                self.bridge
                    .resolve_redirect(Some(&session), explicit_redirect)
                    .await,
            ),
            None => PageLoad::ShowLogin,
        }
    }

    /// Computes the post-login redirect for an established session.
    pub async fn redirect_for(
        &self,
        session: &Session,
        explicit_redirect: Option<&str>,
    ) -> RedirectTarget {
        self.bridge
            .resolve_redirect(Some(session), explicit_redirect)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::HandoffMode;
    use crate::error::ProfileError;
    use crate::profile::UserProfile;
    use crate::router::Destinations;
    use async_trait::async_trait;
    use gangway_core::UserId;
    use std::sync::Mutex;

    fn test_user() -> AuthUser {
        AuthUser::new(UserId::from("user-1"), Some("alice@example.com".to_string()))
    }

    fn test_session() -> Session {
        Session::new(
            "AT".to_string(),
            "RT".to_string(),
            3600,
            "bearer".to_string(),
            test_user(),
        )
    }

    struct FakeProvider {
        session: Option<Session>,
        sign_in: Result<Session, IdentityError>,
        sign_up: Result<AuthUser, IdentityError>,
        email_result: Result<(), IdentityError>,
        magic_link_redirects: Mutex<Vec<Option<String>>>,
    }

    impl FakeProvider {
        fn signed_out() -> Self {
            Self {
                session: None,
                sign_in: Ok(test_session()),
                sign_up: Ok(test_user()),
                email_result: Ok(()),
                magic_link_redirects: Mutex::new(Vec::new()),
            }
        }

        fn signed_in() -> Self {
            Self {
                session: Some(test_session()),
                ..Self::signed_out()
            }
        }

        fn with_sign_in(result: Result<Session, IdentityError>) -> Self {
            Self {
                sign_in: result,
                ..Self::signed_out()
            }
        }
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn sign_in_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<Session, IdentityError> {
            self.sign_in.clone()
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _email_redirect_to: Option<&str>,
        ) -> Result<AuthUser, IdentityError> {
            self.sign_up.clone()
        }

        async fn send_magic_link(
            &self,
            _email: &str,
            redirect_to: Option<&str>,
        ) -> Result<(), IdentityError> {
            self.magic_link_redirects
                .lock()
                .expect("lock")
                .push(redirect_to.map(str::to_string));
            self.email_result.clone()
        }

        async fn send_password_reset(
            &self,
            _email: &str,
            _redirect_to: Option<&str>,
        ) -> Result<(), IdentityError> {
            self.email_result.clone()
        }

        async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
            Ok(self.session.clone())
        }

        async fn wait_for_session(&self) -> Result<Option<Session>, IdentityError> {
            Ok(self.session.clone())
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    struct FixedProfile(Option<UserProfile>);

    #[async_trait]
    impl ProfileStore for FixedProfile {
        async fn fetch(
            &self,
            _user_id: &UserId,
            _access_token: Option<&str>,
        ) -> Result<Option<UserProfile>, ProfileError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProfile;

    #[async_trait]
    impl ProfileStore for FailingProfile {
        async fn fetch(
            &self,
            _user_id: &UserId,
            _access_token: Option<&str>,
        ) -> Result<Option<UserProfile>, ProfileError> {
            Err(ProfileError::Transport {
                reason: "connection refused".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingDirectory {
        records: Mutex<Vec<CustomerRecord>>,
    }

    #[async_trait]
    impl CustomerDirectory for RecordingDirectory {
        async fn register(&self, record: &CustomerRecord) -> Result<(), ProfileError> {
            self.records.lock().expect("lock").push(record.clone());
            Ok(())
        }
    }

    struct FailingDirectory;

    #[async_trait]
    impl CustomerDirectory for FailingDirectory {
        async fn register(&self, _record: &CustomerRecord) -> Result<(), ProfileError> {
            Err(ProfileError::Query {
                status: 409,
                message: "duplicate key".to_string(),
            })
        }
    }

    fn flows(
        identity: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        directory: Option<Arc<dyn CustomerDirectory>>,
    ) -> AuthFlows {
        let bridge = SessionBridge::new(
            RoleRouter::new(Destinations::new(
                "https://portal.example.com/portal.html".to_string(),
                "https://ops.example.com".to_string(),
            )),
            profiles.clone(),
            HandoffMode::Recovery,
        );
        AuthFlows::new(
            identity,
            profiles,
            directory,
            bridge,
            "https://login.example.com/login.html".to_string(),
        )
    }

    fn customer_profile() -> Arc<dyn ProfileStore> {
        Arc::new(FixedProfile(Some(UserProfile {
            role: Some("customer".to_string()),
            service_access: Some(serde_json::json!({ "billing": true })),
        })))
    }

    #[tokio::test]
    async fn login_success_carries_profile() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            None,
        );

        match flows.login("alice@example.com", "secret").await {
            LoginOutcome::Success {
                user,
                role,
                service_access,
                session,
            } => {
                assert_eq!(user.id.as_str(), "user-1");
                assert_eq!(role.as_deref(), Some("customer"));
                assert_eq!(service_access, Some(serde_json::json!({ "billing": true })));
                assert_eq!(session.access_token(), "AT");
            }
            LoginOutcome::Failure { message } => panic!("unexpected failure: {message}"),
        }
    }

    #[tokio::test]
    async fn login_surfaces_provider_message_verbatim() {
        let provider = FakeProvider::with_sign_in(Err(IdentityError::Provider {
            status: 400,
            message: "Invalid login credentials".to_string(),
        }));
        let flows = flows(Arc::new(provider), customer_profile(), None);

        match flows.login("alice@example.com", "wrong").await {
            LoginOutcome::Failure { message } => {
                assert_eq!(message, "Invalid login credentials");
            }
            LoginOutcome::Success { .. } => panic!("unexpected success"),
        }
    }

    #[tokio::test]
    async fn login_transport_failure_gets_generic_message() {
        let provider = FakeProvider::with_sign_in(Err(IdentityError::Transport {
            reason: "connection refused".to_string(),
        }));
        let flows = flows(Arc::new(provider), customer_profile(), None);

        match flows.login("alice@example.com", "secret").await {
            LoginOutcome::Failure { message } => {
                assert_eq!(message, LOGIN_FAILED);
            }
            LoginOutcome::Success { .. } => panic!("unexpected success"),
        }
    }

    #[tokio::test]
    async fn login_tolerates_profile_lookup_failure() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            Arc::new(FailingProfile),
            None,
        );

        match flows.login("alice@example.com", "secret").await {
            LoginOutcome::Success { role, .. } => assert_eq!(role, None),
            LoginOutcome::Failure { message } => panic!("unexpected failure: {message}"),
        }
    }

    #[tokio::test]
    async fn sign_up_rejects_mismatched_confirmation() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            None,
        );

        let outcome = flows
            .sign_up("alice@example.com", "secret", "different")
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: PASSWORDS_DO_NOT_MATCH.to_string()
            }
        );
    }

    #[tokio::test]
    async fn sign_up_registers_customer_record() {
        let directory = Arc::new(RecordingDirectory::default());
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            Some(directory.clone()),
        );

        let outcome = flows.sign_up("alice@example.com", "secret", "secret").await;

        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                message: SIGNUP_ACCEPTED.to_string()
            }
        );
        let records = directory.records.lock().expect("lock");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "alice@example.com");
        assert!(records[0].magic_link_enabled);
        assert!(records[0].password_enabled);
    }

    #[tokio::test]
    async fn sign_up_tolerates_directory_failure() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            Some(Arc::new(FailingDirectory)),
        );

        let outcome = flows.sign_up("alice@example.com", "secret", "secret").await;

        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
    }

    #[tokio::test]
    async fn magic_link_defaults_redirect_to_login_page() {
        let provider = Arc::new(FakeProvider::signed_out());
        let flows = flows(provider.clone(), customer_profile(), None);

        let outcome = flows.request_magic_link("alice@example.com", None).await;

        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
        let redirects = provider.magic_link_redirects.lock().expect("lock");
        assert_eq!(
            *redirects,
            vec![Some("https://login.example.com/login.html".to_string())]
        );
    }

    #[tokio::test]
    async fn magic_link_honors_explicit_redirect() {
        let provider = Arc::new(FakeProvider::signed_out());
        let flows = flows(provider.clone(), customer_profile(), None);

        flows
            .request_magic_link("alice@example.com", Some("https://example.com/x"))
            .await;

        let redirects = provider.magic_link_redirects.lock().expect("lock");
        assert_eq!(*redirects, vec![Some("https://example.com/x".to_string())]);
    }

    #[tokio::test]
    async fn password_reset_accepted() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            None,
        );

        let outcome = flows.request_password_reset("alice@example.com").await;

        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                message: RESET_SENT.to_string()
            }
        );
    }

    #[tokio::test]
    async fn page_load_without_session_shows_login() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            None,
        );

        assert!(matches!(
            flows.on_page_load(None).await,
            PageLoad::ShowLogin
        ));
    }

    #[tokio::test]
    async fn page_load_with_session_redirects_with_fragment() {
        let flows = flows(
            Arc::new(FakeProvider::signed_in()),
            customer_profile(),
            None,
        );

        match flows.on_page_load(None).await {
            PageLoad::Redirect(target) => {
                assert_eq!(target.base(), "https://portal.example.com/portal.html");
                assert!(target.fragment().is_some());
            }
            PageLoad::ShowLogin => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn page_load_honors_explicit_redirect() {
        let flows = flows(
            Arc::new(FakeProvider::signed_in()),
            customer_profile(),
            None,
        );

        match flows.on_page_load(Some("https://example.com/x")).await {
            PageLoad::Redirect(target) => assert_eq!(target.base(), "https://example.com/x"),
            PageLoad::ShowLogin => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn redirect_for_established_session() {
        let flows = flows(
            Arc::new(FakeProvider::signed_out()),
            customer_profile(),
            None,
        );

        let target = flows.redirect_for(&test_session(), None).await;

        assert_eq!(target.base(), "https://portal.example.com/portal.html");
        assert!(
            target
                .fragment()
                .expect("fragment")
                .ends_with("type=recovery")
        );
    }
}
