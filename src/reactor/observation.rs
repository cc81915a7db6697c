//! What the reactor sees of a binding at one point in time

use crate::models::{BindingPhase, SPIAccessTokenBinding};

/// The status fields both reactions depend on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSnapshot {
    pub oauth_url: Option<String>,
    pub phase: Option<BindingPhase>,
    pub synced_secret: Option<String>,
    pub error_message: Option<String>,
}

impl From<&SPIAccessTokenBinding> for BindingSnapshot {
    fn from(binding: &SPIAccessTokenBinding) -> Self {
        Self {
            oauth_url: binding.oauth_url().map(str::to_string),
            phase: binding.phase(),
            synced_secret: binding.synced_secret_name().map(str::to_string),
            error_message: binding.error_message().map(str::to_string),
        }
    }
}

/// Target name, loaded flag and latest snapshot, taken together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub name: String,
    pub loaded: bool,
    pub snapshot: Option<BindingSnapshot>,
}

/// Dependencies of the auth-window opener
pub(crate) type OpenerDeps<'a> = (&'a str, bool, Option<&'a str>);

/// Dependencies of the phase resolver
pub(crate) type PhaseDeps<'a> = (
    &'a str,
    bool,
    Option<&'a BindingPhase>,
    Option<&'a str>,
    Option<&'a str>,
);

impl Observation {
    pub fn new(name: impl Into<String>, loaded: bool, snapshot: Option<BindingSnapshot>) -> Self {
        Self {
            name: name.into(),
            loaded,
            snapshot,
        }
    }

    /// Reactions only run for a named, loaded binding
    pub fn is_active(&self) -> bool {
        !self.name.is_empty() && self.loaded
    }

    pub fn oauth_url(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.oauth_url.as_deref())
    }

    pub fn phase(&self) -> Option<&BindingPhase> {
        self.snapshot.as_ref().and_then(|s| s.phase.as_ref())
    }

    pub fn synced_secret(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.synced_secret.as_deref())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.error_message.as_deref())
    }

    pub(crate) fn opener_deps(&self) -> OpenerDeps<'_> {
        (&self.name, self.loaded, self.oauth_url())
    }

    pub(crate) fn phase_deps(&self) -> PhaseDeps<'_> {
        (
            &self.name,
            self.loaded,
            self.phase(),
            self.error_message(),
            self.synced_secret(),
        )
    }
}
