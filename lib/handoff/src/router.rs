//! Role-based destination routing.
//!
//! A pure mapping from the user's role (plus an optional explicit override)
//! to the base URL of the property they land on after sign-in.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Destination base URLs for the downstream web properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    /// Customer-facing portal.
    portal_url: String,
    /// Internal operations surface for staff and admins.
    operations_url: String,
}

impl Destinations {
    /// Creates a destination set.
    #[must_use]
    pub fn new(portal_url: String, operations_url: String) -> Self {
        Self {
            portal_url,
            operations_url,
        }
    }

    /// Returns the portal base URL.
    #[must_use]
    pub fn portal_url(&self) -> &str {
        &self.portal_url
    }

    /// Returns the operations base URL.
    #[must_use]
    pub fn operations_url(&self) -> &str {
        &self.operations_url
    }
}

/// Maps roles to destinations.
#[derive(Debug, Clone)]
pub struct RoleRouter {
    destinations: Destinations,
}

impl RoleRouter {
    /// Creates a router over the given destinations.
    #[must_use]
    pub fn new(destinations: Destinations) -> Self {
        Self { destinations }
    }

    /// Returns the configured destinations.
    #[must_use]
    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    /// Computes the destination for a role.
    ///
    /// Total and deterministic: every input, including an empty or absent
    /// role, maps to exactly one non-empty destination.
    ///
    /// - A non-empty `explicit_override` always wins and is returned
    ///   unchanged.
    /// - `customer` routes to the portal; `staff` and `admin` route to the
    ///   operations surface (admins have no separate surface).
    /// - The `unknown` sentinel routes to the operations surface: a failed
    ///   role lookup must not quietly hand a staff member the customer
    ///   routing.
    /// - Anything else routes to the general-audience portal, with a
    ///   warning.
    #[must_use]
    pub fn route(&self, role: Option<&str>, explicit_override: Option<&str>) -> String {
        if let Some(explicit) = explicit_override {
            if !explicit.is_empty() {
                return explicit.to_string();
            }
        }

        match role.and_then(Role::parse) {
            Some(Role::Customer) => self.destinations.portal_url().to_string(),
            Some(Role::Staff | Role::Admin | Role::Unknown) => {
                self.destinations.operations_url().to_string()
            }
            None => {
                warn!(
                    role = role.unwrap_or(""),
                    "unrecognized role, routing to portal"
                );
                self.destinations.portal_url().to_string()
            }
        }
    }
}
