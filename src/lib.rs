//! spibind library
//!
//! Watches an SPI access token binding and reacts to its status: opens the
//! OAuth page while authorization is pending, commits the injected secret
//! name into a form document, and notifies the user about the outcome.
//! It can be used both as a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod effects;
pub mod kube;
pub mod models;
pub mod reactor;
pub mod services;
pub mod watcher;

// Re-export commonly used types for convenience
pub use effects::{AUTH_SECRET_FIELD, AuthLauncher, FormSink, Notification, Notifier};
pub use models::{BindingPhase, SPIAccessTokenBinding};
pub use reactor::{BindingReactor, BindingSnapshot, Effect, Observation, reduce};
pub use watcher::{BindingState, BindingWatcher, WatchEvent};
