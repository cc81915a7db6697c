//! Service layer
//!
//! Ties the Kubernetes-facing pieces (watcher, API calls) to the reactor,
//! keeping the CLI layer focused on argument handling and output.

pub mod auth_session;
pub mod binding_service;

pub use auth_session::{AuthSession, SessionDriver, SessionFlow, SessionOutcome};
pub use binding_service::{BindingService, build_binding, validate_repo_url};
