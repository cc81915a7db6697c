//! Config command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{
    ConfigLoader, get_config_value, paths, set_config_value, set_overlay_value,
};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "openBrowser", "binding.secretType")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "openBrowser", "binding.secretType")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
///
/// `context` is the global `--context` flag. It selects which
/// context-specific layer is merged on top of the root config, and which
/// file `set` writes to.
pub fn handle_config_command(cmd: ConfigSubcommand, context: Option<&str>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(context).context("Failed to load configuration")?;

            if let Some(key) = key {
                println!("{}", get_config_value(&config, &key)?);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => match context {
            // Context files are overlays: write only the key being set
            Some(ctx) => {
                let path = paths::context_config_path(ctx);
                let mut overlay = ConfigLoader::load_overlay(&path)?;
                set_overlay_value(&mut overlay, &key, &value)
                    .with_context(|| format!("Failed to set {} = {}", key, value))?;
                ConfigLoader::save_overlay(&overlay, &path)
                    .context("Failed to save context configuration")?;
                println!("Configuration saved for context: {}", ctx);
            }
            None => {
                let path = paths::root_config_path();
                let mut config = if path.exists() {
                    ConfigLoader::load_file(&path)?
                } else {
                    ConfigLoader::load_defaults()
                };
                set_config_value(&mut config, &key, &value)
                    .with_context(|| format!("Failed to set {} = {}", key, value))?;
                ConfigLoader::save_root(&config).context("Failed to save configuration")?;
                println!("Configuration saved");
            }
        },
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(context).context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
            if let Some(ctx) = context {
                println!("{}", paths::context_config_path(ctx).display());
            }
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(context).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
