//! Error types for the identity crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `IdentityError`: Failures talking to the identity provider
//! - `StorageError`: Failures of the session storage adapter

use std::fmt;

/// Errors from identity-provider operations.
///
/// Provider-supplied messages are preserved verbatim so the embedding UI can
/// surface them in inline alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Client construction or configuration failed.
    Configuration { reason: String },
    /// The request never produced a response.
    Transport { reason: String },
    /// The provider rejected the request.
    Provider { status: u16, message: String },
    /// The provider responded with a body this client cannot interpret.
    InvalidResponse { reason: String },
    /// The session storage adapter failed.
    Storage { reason: String },
}

impl IdentityError {
    /// Returns the message to surface to the user, if the provider sent one.
    ///
    /// Transport and decoding failures return `None`; callers fall back to a
    /// generic message for those.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Provider { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "identity client configuration error: {reason}")
            }
            Self::Transport { reason } => {
                write!(f, "identity provider unreachable: {reason}")
            }
            Self::Provider { status, message } => {
                write!(f, "identity provider error ({status}): {message}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "unexpected identity provider response: {reason}")
            }
            Self::Storage { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Errors from the session storage adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the durable store failed.
    Io { reason: String },
    /// A stored value could not be encoded or decoded.
    Serialization { reason: String },
    /// The store's lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { reason } => write!(f, "storage I/O failed: {reason}"),
            Self::Serialization { reason } => {
                write!(f, "storage serialization failed: {reason}")
            }
            Self::Poisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for IdentityError {
    fn from(err: StorageError) -> Self {
        Self::Storage {
            reason: err.to_string(),
        }
    }
}
