//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Context-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    pub fn load(context: Option<&str>) -> Result<Config> {
        let context_path = context.map(paths::context_config_path);
        let config = Self::load_layers(&paths::root_config_path(), context_path.as_deref())?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Merge the root file and an optional context overlay, skipping
    /// files that do not exist
    pub fn load_layers(root_path: &Path, context_path: Option<&Path>) -> Result<Config> {
        let mut config = Self::load_defaults();

        if root_path.exists() {
            config = Self::load_file(root_path)?;
        }

        if let Some(context_path) = context_path.filter(|p| p.exists()) {
            config = Self::merge_config(config, context_path)?;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate the merged configuration
    pub fn validate(context: Option<&str>) -> Result<Config> {
        let config = Self::load(context).context("Failed to load merged configuration")?;

        if config.binding.secret_type.trim().is_empty() {
            return Err(anyhow::anyhow!("binding.secretType must not be empty"));
        }
        if config.binding.permissions.is_empty() {
            return Err(anyhow::anyhow!(
                "binding.permissions must request at least one permission"
            ));
        }
        if let Some(p) = config
            .binding
            .permissions
            .iter()
            .find(|p| p.kind.is_empty() || p.area.is_empty())
        {
            return Err(anyhow::anyhow!(
                "binding.permissions entry '{}:{}' needs both type and area",
                p.kind,
                p.area
            ));
        }

        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Overlay a partial YAML document onto `base`
    ///
    /// Only keys present in the overlay replace values in `base`, so a
    /// context file can override a single setting.
    fn merge_config(base: Config, overlay_path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(overlay_path).with_context(|| {
            format!("Failed to read config file: {}", overlay_path.display())
        })?;
        let overlay: serde_yaml::Value = serde_yaml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", overlay_path.display())
        })?;
        Self::merge_value(base, overlay)
    }

    fn merge_value(base: Config, overlay: serde_yaml::Value) -> Result<Config> {
        let mut merged =
            serde_yaml::to_value(&base).context("Failed to serialize configuration")?;
        merge_yaml(&mut merged, overlay);
        serde_yaml::from_value(merged).context("Failed to merge configuration")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(namespace) = std::env::var("SPIBIND_NAMESPACE") {
            config.default_namespace = namespace;
        }

        if let Ok(open_browser) = std::env::var("SPIBIND_OPEN_BROWSER") {
            if let Ok(val) = open_browser.parse::<bool>() {
                config.open_browser = val;
            }
        }

        if let Ok(form_path) = std::env::var("SPIBIND_FORM_PATH") {
            config.form_path = if form_path.is_empty() {
                None
            } else {
                Some(form_path)
            };
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }

    /// Read a context overlay as a raw document
    ///
    /// A missing or empty file yields an empty mapping.
    pub fn load_overlay(path: &Path) -> Result<serde_yaml::Value> {
        if !path.exists() {
            return Ok(serde_yaml::Value::Mapping(Default::default()));
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let overlay: serde_yaml::Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(match overlay {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        })
    }

    /// Write a context overlay as-is, without filling in defaults
    pub fn save_overlay(overlay: &serde_yaml::Value, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(overlay).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{set_config_value, set_overlay_value};

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.open_browser);
        assert_eq!(config.default_namespace, "");
    }

    #[test]
    fn test_merge_only_overrides_present_keys() {
        let base = Config {
            default_namespace: "root-ns".to_string(),
            open_browser: false,
            ..Default::default()
        };
        let overlay: serde_yaml::Value =
            serde_yaml::from_str("binding:\n  secretType: kubernetes.io/ssh-auth\n").unwrap();

        let merged = ConfigLoader::merge_value(base, overlay).unwrap();
        assert_eq!(merged.default_namespace, "root-ns");
        assert!(!merged.open_browser);
        assert_eq!(merged.binding.secret_type, "kubernetes.io/ssh-auth");
        assert_eq!(merged.binding.permissions.len(), 1);
    }

    #[test]
    fn test_context_overlay_keeps_root_values() {
        let dir = tempfile::tempdir().unwrap();
        let root_path = dir.path().join("config.yaml");
        let context_path = dir.path().join("contexts").join("kind-dev.yaml");

        let mut root = ConfigLoader::load_defaults();
        set_config_value(&mut root, "openBrowser", "false").unwrap();
        ConfigLoader::save(&root, &root_path).unwrap();

        let mut overlay = ConfigLoader::load_overlay(&context_path).unwrap();
        set_overlay_value(&mut overlay, "defaultNamespace", "team-a").unwrap();
        ConfigLoader::save_overlay(&overlay, &context_path).unwrap();

        let merged = ConfigLoader::load_layers(&root_path, Some(&context_path)).unwrap();
        assert!(!merged.open_browser);
        assert_eq!(merged.default_namespace, "team-a");

        let written = std::fs::read_to_string(&context_path).unwrap();
        insta::assert_snapshot!(written.trim_end(), @"defaultNamespace: team-a");
    }

    #[test]
    fn test_context_overlay_nested_key() {
        let mut overlay = serde_yaml::Value::Null;
        set_overlay_value(&mut overlay, "binding.secretType", "kubernetes.io/ssh-auth").unwrap();
        set_overlay_value(&mut overlay, "formPath", "").unwrap();

        let base = Config {
            form_path: Some("component.yaml".to_string()),
            ..Default::default()
        };
        let merged = ConfigLoader::merge_value(base, overlay).unwrap();
        assert_eq!(merged.binding.secret_type, "kubernetes.io/ssh-auth");
        assert_eq!(merged.binding.permissions.len(), 1);
        assert!(merged.form_path.is_none());
    }

    #[test]
    fn test_context_overlay_rejects_bad_value() {
        let mut overlay = serde_yaml::Value::Null;
        assert!(set_overlay_value(&mut overlay, "openBrowser", "maybe").is_err());
        assert!(set_overlay_value(&mut overlay, "watch.interval", "5s").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            default_namespace: "saved-ns".to_string(),
            ..Default::default()
        };

        ConfigLoader::save(&config, &path).unwrap();
        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // Only this test touches the SPIBIND_* variables.
        unsafe {
            std::env::set_var("SPIBIND_NAMESPACE", "env-ns");
            std::env::set_var("SPIBIND_OPEN_BROWSER", "false");
            std::env::set_var("SPIBIND_FORM_PATH", "/tmp/form.yaml");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.default_namespace, "env-ns");
        assert!(!config.open_browser);
        assert_eq!(config.form_path.as_deref(), Some("/tmp/form.yaml"));

        // SAFETY: see above.
        unsafe {
            std::env::remove_var("SPIBIND_NAMESPACE");
            std::env::remove_var("SPIBIND_OPEN_BROWSER");
            std::env::remove_var("SPIBIND_FORM_PATH");
        }
    }
}
