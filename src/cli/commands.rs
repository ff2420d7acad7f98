//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use kestra_export::config::{self, paths, ConfigLoader};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "baseUrl", "pagination.pageSize")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "baseUrl", "pagination.pageSize")
        key: String,
        /// Configuration value (empty clears optional keys)
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate {
        /// Validate this file layered on the root configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Handle configuration subcommands
pub async fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            // Load config (will use defaults if no file exists)
            let config = ConfigLoader::load(None).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml = serde_yaml::to_string(&config.redacted())
                    .context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Only the root file is edited; env overrides must not leak into it
            let path = paths::root_config_path();
            let mut config =
                ConfigLoader::load_file(&path).unwrap_or_else(|_| ConfigLoader::load_defaults());

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {}", key))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(None).context("Failed to load configuration")?;

            let yaml = serde_yaml::to_string(&config.redacted())
                .context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            let config_path = paths::root_config_path();
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate { config } => {
            match ConfigLoader::load(config.as_deref())
                .and_then(|c| ConfigLoader::validate(&c))
            {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
