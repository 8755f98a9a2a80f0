//! Core domain types for the gangway sign-in front end.
//!
//! This crate provides the foundational identifier types and the error
//! handling foundation shared by the gangway crates. Gangway delegates all
//! authentication to an external identity provider, so identifiers here wrap
//! provider-issued values rather than locally generated ones.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::UserId;
