//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

use crate::models::{DEFAULT_SECRET_TYPE, Permission};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace to watch and create bindings in (empty = kubeconfig namespace)
    #[serde(default)]
    pub default_namespace: String,

    /// Open the OAuth page in a browser instead of only printing it
    #[serde(default = "default_true")]
    pub open_browser: bool,

    /// Stop watching once the binding is Injected or Error
    #[serde(default = "default_true")]
    pub exit_on_terminal: bool,

    /// YAML form document the injected secret name is written into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_path: Option<String>,

    /// Settings for bindings created with `spibind bind`
    #[serde(default)]
    pub binding: BindingConfig,
}

/// Binding creation defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingConfig {
    /// Secret type the operator should create
    #[serde(default = "default_secret_type")]
    pub secret_type: String,

    /// Permissions requested for the token
    #[serde(default = "default_permissions")]
    pub permissions: Vec<Permission>,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_secret_type() -> String {
    DEFAULT_SECRET_TYPE.to_string()
}

fn default_permissions() -> Vec<Permission> {
    vec![Permission::new("rw", "repository")]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: String::new(),
            open_browser: default_true(),
            exit_on_terminal: default_true(),
            form_path: None,
            binding: BindingConfig::default(),
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            secret_type: default_secret_type(),
            permissions: default_permissions(),
        }
    }
}
