//! Configuration system for spibind
//!
//! Layered YAML configuration: built-in defaults, the root config file, an
//! optional per-kubeconfig-context file, then environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{BindingConfig, Config};

use anyhow::Context;

use crate::models::Permission;

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "openBrowser" => Ok(config.open_browser.to_string()),
        "exitOnTerminal" => Ok(config.exit_on_terminal.to_string()),
        "formPath" => Ok(config.form_path.clone().unwrap_or_default()),
        "binding.secretType" => Ok(config.binding.secret_type.clone()),
        "binding.permissions" => Ok(format_permissions(&config.binding.permissions)),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "openBrowser" => {
            config.open_browser = value
                .parse()
                .context("openBrowser must be 'true' or 'false'")?;
        }
        "exitOnTerminal" => {
            config.exit_on_terminal = value
                .parse()
                .context("exitOnTerminal must be 'true' or 'false'")?;
        }
        "formPath" => {
            config.form_path = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "binding.secretType" => {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("binding.secretType must not be empty"));
            }
            config.binding.secret_type = value.to_string();
        }
        "binding.permissions" => {
            config.binding.permissions = parse_permissions(value)?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

/// Set one key in a partial (context) configuration document
///
/// The value is parsed and checked exactly as `set_config_value` does, but
/// only that key is written, so the document keeps overriding nothing else.
pub fn set_overlay_value(
    overlay: &mut serde_yaml::Value,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    let mut parsed = Config::default();
    set_config_value(&mut parsed, key, value)?;
    let parsed = serde_yaml::to_value(&parsed).context("Failed to serialize configuration")?;
    // Cleared optional keys are skipped on serialization; null clears them on merge
    let field = key
        .split('.')
        .try_fold(&parsed, |node, segment| node.get(segment))
        .cloned()
        .unwrap_or(serde_yaml::Value::Null);

    if !overlay.is_mapping() {
        *overlay = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }

    let mut node = overlay;
    let mut segments = key.split('.').peekable();
    while let Some(segment) = segments.next() {
        let serde_yaml::Value::Mapping(map) = node else {
            return Err(anyhow::anyhow!("Cannot set {}: parent is not a mapping", key));
        };
        let segment = serde_yaml::Value::String(segment.to_string());
        if segments.peek().is_none() {
            map.insert(segment, field);
            break;
        }
        let child = map
            .entry(segment)
            .or_insert_with(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
        if !child.is_mapping() {
            *child = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        }
        node = child;
    }

    Ok(())
}

/// Parse `type:area` pairs separated by commas (e.g. `rw:repository,r:webhook`)
pub fn parse_permissions(value: &str) -> anyhow::Result<Vec<Permission>> {
    let permissions: Vec<Permission> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (kind, area) = entry.split_once(':').ok_or_else(|| {
                anyhow::anyhow!("permission '{}' must be written as type:area", entry)
            })?;
            let (kind, area) = (kind.trim(), area.trim());
            if kind.is_empty() || area.is_empty() {
                return Err(anyhow::anyhow!(
                    "permission '{}' must be written as type:area",
                    entry
                ));
            }
            Ok(Permission::new(kind, area))
        })
        .collect::<anyhow::Result<_>>()?;

    if permissions.is_empty() {
        return Err(anyhow::anyhow!(
            "binding.permissions must request at least one permission"
        ));
    }
    Ok(permissions)
}

fn format_permissions(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| format!("{}:{}", p.kind, p.area))
        .collect::<Vec<_>>()
        .join(",")
}
