//! SPI model layer
//!
//! Rust types for the SPI custom resources this tool watches and creates.
//!
//! Structure:
//! - `binding.rs` - `SPIAccessTokenBinding` custom resource and its status
//! - `binding_phase.rs` - typed view over `status.phase`

pub mod binding;
pub mod binding_phase;

pub use binding::{
    BindingPermissions, BindingSecret, Permission, SPIAccessTokenBinding,
    SPIAccessTokenBindingSpec, SPIAccessTokenBindingStatus, SyncedObjectRef,
    DEFAULT_SECRET_TYPE, GENERATE_NAME_PREFIX,
};
pub use binding_phase::BindingPhase;
