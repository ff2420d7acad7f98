//! Configuration system for kestra-export
//!
//! Layered YAML configuration (defaults, root file, explicit file,
//! environment) describing which instance to export and how.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, ExportsConfig, PaginationConfig};

use anyhow::Context;

/// Get a configuration value by key (dot notation)
///
/// Secrets are masked.
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    let shown = config.redacted();
    match key {
        "baseUrl" => Ok(shown.base_url),
        "tenant" => Ok(shown.tenant),
        "username" => Ok(shown.username.unwrap_or_default()),
        "password" => Ok(shown.password.unwrap_or_default()),
        "apiToken" => Ok(shown.api_token.unwrap_or_default()),
        "verifySsl" => Ok(shown.verify_ssl.to_string()),
        "requestTimeout" => Ok(shown.request_timeout.unwrap_or_default()),
        "outputDir" => Ok(shown.output_dir.display().to_string()),
        "pagination.pageSize" => Ok(shown.pagination.page_size.to_string()),
        "pagination.strict" => Ok(shown.pagination.strict.to_string()),
        "exports.flowsBundle" => Ok(shown.exports.flows_bundle.to_string()),
        "exports.kv" => Ok(shown.exports.kv.to_string()),
        "exports.namespaceFiles" => Ok(shown.exports.namespace_files.to_string()),
        "exports.namespaceFileContent" => Ok(shown.exports.namespace_file_content.to_string()),
        "exports.iam" => Ok(shown.exports.iam.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
///
/// An empty value clears optional keys.
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
    match key {
        "baseUrl" => {
            url::Url::parse(value).context("baseUrl must be a valid URL")?;
            config.base_url = value.to_string();
        }
        "tenant" => {
            config.tenant = value.to_string();
        }
        "username" => {
            config.username = optional(value);
        }
        "password" => {
            config.password = optional(value);
        }
        "apiToken" => {
            config.api_token = optional(value);
        }
        "verifySsl" => {
            config.verify_ssl = value
                .parse()
                .context("verifySsl must be 'true' or 'false'")?;
        }
        "requestTimeout" => {
            if !value.is_empty() {
                crate::client::parse_duration(value)
                    .context("requestTimeout must look like '30s', '1m' or '500ms'")?;
            }
            config.request_timeout = optional(value);
        }
        "outputDir" => {
            config.output_dir = value.into();
        }
        "pagination.pageSize" => {
            let size: u32 = value
                .parse()
                .context("pagination.pageSize must be a number")?;
            if size == 0 {
                anyhow::bail!("pagination.pageSize must be at least 1");
            }
            config.pagination.page_size = size;
        }
        "pagination.strict" => {
            config.pagination.strict = value
                .parse()
                .context("pagination.strict must be 'true' or 'false'")?;
        }
        "exports.flowsBundle" => {
            config.exports.flows_bundle = value
                .parse()
                .context("exports.flowsBundle must be 'true' or 'false'")?;
        }
        "exports.kv" => {
            config.exports.kv = value
                .parse()
                .context("exports.kv must be 'true' or 'false'")?;
        }
        "exports.namespaceFiles" => {
            config.exports.namespace_files = value
                .parse()
                .context("exports.namespaceFiles must be 'true' or 'false'")?;
        }
        "exports.namespaceFileContent" => {
            config.exports.namespace_file_content = value
                .parse()
                .context("exports.namespaceFileContent must be 'true' or 'false'")?;
        }
        "exports.iam" => {
            config.exports.iam = value
                .parse()
                .context("exports.iam must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_masks_secrets() {
        let config = Config {
            password: Some("admin1234".to_string()),
            ..Default::default()
        };
        assert_eq!(get_config_value(&config, "password").unwrap(), "****");
        assert_eq!(get_config_value(&config, "apiToken").unwrap(), "");
        assert_eq!(get_config_value(&config, "tenant").unwrap(), "main");
        assert!(get_config_value(&config, "nope").is_err());
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        set_config_value(&mut config, "pagination.pageSize", "50").unwrap();
        set_config_value(&mut config, "exports.kv", "false").unwrap();
        set_config_value(&mut config, "username", "admin@kestra.io").unwrap();

        assert_eq!(config.pagination.page_size, 50);
        assert!(!config.exports.kv);
        assert_eq!(config.username.as_deref(), Some("admin@kestra.io"));

        set_config_value(&mut config, "username", "").unwrap();
        assert_eq!(config.username, None);
    }

    #[test]
    fn test_set_rejects_invalid() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "pagination.pageSize", "0").is_err());
        assert!(set_config_value(&mut config, "verifySsl", "maybe").is_err());
        assert!(set_config_value(&mut config, "baseUrl", "not a url").is_err());
        assert!(set_config_value(&mut config, "requestTimeout", "forever").is_err());
        assert!(set_config_value(&mut config, "unknown", "x").is_err());
    }
}
