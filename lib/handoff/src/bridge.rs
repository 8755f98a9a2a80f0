//! Cross-subdomain session handoff.
//!
//! The bridge computes where an authenticated user goes after sign-in and
//! encodes the session's credentials into a URL fragment so the receiving
//! property — on a sibling subdomain, a different origin — can adopt the
//! session without a server round trip.
//!
//! The fragment contract is wire-level and must match the receiving services
//! exactly: `access_token`, `refresh_token`, `expires_in`, `token_type` as
//! form-URL-encoded pairs after a single `#`, optionally followed by
//! `type=recovery` in the recovery deployment mode.

use crate::profile::ProfileStore;
use crate::role::Role;
use crate::router::RoleRouter;
use gangway_identity::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;

/// How session tokens are encoded on the redirect fragment.
///
/// `Recovery` appends a `type=recovery` marker telling the receiving
/// property to adopt the tokens as a session transfer. The mode is fixed per
/// deployment; the two are never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// The four token parameters only.
    Plain,
    /// The token parameters plus the `type=recovery` marker.
    #[default]
    Recovery,
}

/// A computed navigation target.
///
/// Recomputed per navigation event, never persisted. The fragment is present
/// exactly when a session was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    base: String,
    fragment: Option<String>,
}

impl RedirectTarget {
    /// Returns the destination base URL.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the encoded fragment, if a session was handed off.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Renders the full location the browser should navigate to.
    #[must_use]
    pub fn location(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{fragment}", self.base),
            None => self.base.clone(),
        }
    }
}

/// Encodes session credentials as fragment parameters.
fn encode_fragment(session: &Session, mode: HandoffMode) -> String {
    let mut pairs = form_urlencoded::Serializer::new(String::new());
    pairs.append_pair("access_token", session.access_token());
    pairs.append_pair("refresh_token", session.refresh_token());
    pairs.append_pair("expires_in", &session.expires_in().to_string());
    pairs.append_pair("token_type", session.token_type());
    if mode == HandoffMode::Recovery {
        pairs.append_pair("type", "recovery");
    }
    pairs.finish()
}

/// Computes post-login redirects: role lookup, destination, fragment.
pub struct SessionBridge {
    router: RoleRouter,
    profiles: Arc<dyn ProfileStore>,
    mode: HandoffMode,
}

impl SessionBridge {
    /// Creates a bridge over the given router and profile store.
    #[must_use]
    pub fn new(router: RoleRouter, profiles: Arc<dyn ProfileStore>, mode: HandoffMode) -> Self {
        Self {
            router,
            profiles,
            mode,
        }
    }

    /// Returns the role router.
    #[must_use]
    pub fn router(&self) -> &RoleRouter {
        &self.router
    }

    /// Resolves the role string for an authenticated session.
    ///
    /// A failed lookup or an absent role falls back to the `unknown`
    /// sentinel, which the router sends to the operations surface. The
    /// failure is logged, never surfaced: it must not block login.
    async fn lookup_role(&self, session: &Session) -> String {
        match self
            .profiles
            .fetch(session.user_id(), Some(session.access_token()))
            .await
        {
            Ok(Some(profile)) => match profile.role {
                Some(role) => role,
                None => {
                    warn!(user = %session.user_id(), "profile has no role, using unknown");
                    Role::Unknown.as_str().to_string()
                }
            },
            Ok(None) => {
                warn!(user = %session.user_id(), "no profile record, using unknown");
                Role::Unknown.as_str().to_string()
            }
            Err(e) => {
                warn!(user = %session.user_id(), error = %e, "role lookup failed, using unknown");
                Role::Unknown.as_str().to_string()
            }
        }
    }

    /// Computes the redirect target for the current authentication state.
    ///
    /// With a session: one role lookup, destination via the router, and the
    /// session encoded onto the fragment. Without one: destination only —
    /// no fragment parameters are ever appended.
    pub async fn resolve_redirect(
        &self,
        session: Option<&Session>,
        explicit_override: Option<&str>,
    ) -> RedirectTarget {
        match session {
            None => RedirectTarget {
                base: self.router.route(None, explicit_override),
                fragment: None,
            },
            Some(session) => {
                let role = self.lookup_role(session).await;
                let base = self.router.route(Some(&role), explicit_override);
                debug!(user = %session.user_id(), role = %role, destination = %base, "resolved redirect");
                RedirectTarget {
                    base,
                    fragment: Some(encode_fragment(session, self.mode)),
                }
            }
        }
    }
}
