//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod auth;
mod config;
mod logging;
mod version;

pub use auth::{
    BindArgs, SessionArgs, StatusArgs, WatchArgs, build_reactor, handle_bind, handle_status,
    handle_watch,
};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use version::display_version;
