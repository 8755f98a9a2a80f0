//! Role-based redirect and cross-subdomain session handoff for gangway.
//!
//! This crate provides:
//! - The role router (`Role`, `RoleRouter`): a total mapping from role to
//!   destination property
//! - The session bridge (`SessionBridge`): role lookup plus the URL-fragment
//!   session handoff
//! - The profile store seam (`ProfileStore`, `RestProfileStore`)
//! - The headless form flows (`AuthFlows`): login, sign-up, magic link,
//!   password reset, and the entry-page session check
//!
//! # Routing Model
//!
//! After sign-in, users land on one of the related web properties based on
//! their role: customers on the portal, staff and admins on the operations
//! surface. A failed role lookup routes to the operations surface (never a
//! silent downgrade to customer routing); an unrecognized role routes to the
//! general-audience portal. An explicit `redirect` query parameter, when the
//! embedder passes one, always wins.
//!
//! # Example
//!
//! ```no_run
//! use gangway_handoff::{AuthFlows, GangwayConfig, PageLoad};
//! use gangway_identity::{InMemoryCookies, MemoryStorage};
//! use std::sync::Arc;
//!
//! # async fn page_load() {
//! let config = GangwayConfig::from_env().expect("configuration");
//! let flows = AuthFlows::from_config(
//!     &config,
//!     Box::new(MemoryStorage::new()),
//!     Arc::new(InMemoryCookies::new()),
//! )
//! .expect("flow stack");
//!
//! match flows.on_page_load(None).await {
//!     PageLoad::Redirect(target) => {
//!         // Terminal: navigate and stop.
//!         println!("-> {}", target.location());
//!     }
//!     PageLoad::ShowLogin => {
//!         // Render the login form.
//!     }
//! }
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod flows;
pub mod profile;
pub mod role;
pub mod router;

// Re-export main types at crate root
pub use bridge::{HandoffMode, RedirectTarget, SessionBridge};
pub use config::{GangwayConfig, HandoffConfig};
pub use error::ProfileError;
pub use flows::{AuthFlows, LoginOutcome, PageLoad, SubmitOutcome};
pub use profile::{CustomerDirectory, CustomerRecord, ProfileStore, RestProfileStore, UserProfile};
pub use role::Role;
pub use router::{Destinations, RoleRouter};
