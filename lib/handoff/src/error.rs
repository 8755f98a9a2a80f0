//! Error types for the handoff crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProfileError`: Failures reading or writing the external profile store
//!
//! Profile errors are never surfaced to users; the bridge logs them and
//! falls back to the unknown-role sentinel.

use std::fmt;

/// Errors from profile-store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Store client construction failed.
    Configuration { reason: String },
    /// The request never produced a response.
    Transport { reason: String },
    /// The store rejected the request.
    Query { status: u16, message: String },
    /// The store responded with a body this client cannot interpret.
    InvalidResponse { reason: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "profile store configuration error: {reason}")
            }
            Self::Transport { reason } => {
                write!(f, "profile store unreachable: {reason}")
            }
            Self::Query { status, message } => {
                write!(f, "profile query failed ({status}): {message}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "unexpected profile store response: {reason}")
            }
        }
    }
}

impl std::error::Error for ProfileError {}
