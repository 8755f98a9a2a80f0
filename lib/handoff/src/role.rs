//! Role types for post-login routing.
//!
//! Roles are assigned out-of-band in the profile store and read once per
//! redirect decision. The set is closed: customer, staff, admin, plus the
//! `unknown` sentinel recorded when a role cannot be determined.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse authorization category determining which downstream property a
/// user lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End customer; lands on the portal.
    Customer,
    /// Staff member; lands on the operations surface.
    Staff,
    /// Administrator; lands on the operations surface by default.
    Admin,
    /// Sentinel for "the role could not be determined".
    Unknown,
}

impl Role {
    /// Parses a role string. Returns `None` for anything outside the closed
    /// set; the router treats those as general-audience.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Self::Customer),
            "staff" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
