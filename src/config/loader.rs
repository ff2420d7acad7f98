//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use crate::client::{parse_duration, ClientSettings, Credentials};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Explicit config file (`--config`)
    /// 3. Root config
    /// 4. Built-in defaults
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let config = Self::load_from(&paths::root_config_path(), explicit)?;

        // Apply environment variable overrides
        Ok(Self::apply_env_overrides(config, |name| std::env::var(name).ok()))
    }

    /// Layer the root file (if present) and an explicit file over the defaults
    ///
    /// Each file only overrides the keys it actually sets; keys it leaves
    /// out keep the value of the layer below.
    pub fn load_from(root: &Path, explicit: Option<&Path>) -> Result<Config> {
        let mut layers = Vec::new();

        // Load root config
        if root.exists() {
            match Self::read_layer(root) {
                Ok(layer) => layers.push(layer),
                Err(e) => tracing::warn!("Ignoring root config: {:#}", e),
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = explicit {
            layers.push(Self::read_layer(path)?);
        }

        Self::merge_layers(layers)
    }

    /// Read one configuration file as an untyped YAML layer
    fn read_layer(path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Merge layers over the defaults, later layers winning, and type the result
    fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Result<Config> {
        let mut merged = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;

        for layer in layers {
            merge_value(&mut merged, layer);
        }

        serde_yaml::from_value(merged).context("Invalid configuration")
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate a fully merged configuration
    pub fn validate(config: &Config) -> Result<()> {
        url::Url::parse(&config.base_url)
            .with_context(|| format!("baseUrl is not a valid URL: {}", config.base_url))?;

        if config.tenant.trim().is_empty() {
            anyhow::bail!("tenant must not be empty");
        }

        if config.pagination.page_size == 0 {
            anyhow::bail!("pagination.pageSize must be at least 1");
        }

        if let Some(timeout) = &config.request_timeout {
            parse_duration(timeout)
                .with_context(|| format!("requestTimeout is not a duration: {}", timeout))?;
        }

        if config.exports.namespace_file_content && !config.exports.namespace_files {
            anyhow::bail!("exports.namespaceFileContent requires exports.namespaceFiles");
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("KESTRA_EXPORT_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(tenant) = lookup("KESTRA_EXPORT_TENANT") {
            config.tenant = tenant;
        }

        if let Some(username) = lookup("KESTRA_EXPORT_USERNAME") {
            config.username = Some(username);
        }

        if let Some(password) = lookup("KESTRA_EXPORT_PASSWORD") {
            config.password = Some(password);
        }

        if let Some(token) = lookup("KESTRA_EXPORT_API_TOKEN") {
            config.api_token = Some(token);
        }

        if let Some(dir) = lookup("KESTRA_EXPORT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(size) = lookup("KESTRA_EXPORT_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(val) => config.pagination.page_size = val,
                Err(_) => tracing::warn!("Ignoring KESTRA_EXPORT_PAGE_SIZE={}: not a number", size),
            }
        }

        if let Some(strict) = lookup("KESTRA_EXPORT_STRICT_PAGINATION") {
            if let Ok(val) = strict.parse::<bool>() {
                config.pagination.strict = val;
            }
        }

        config
    }

    /// Client settings derived from the configuration
    pub fn client_settings(config: &Config) -> Result<ClientSettings> {
        let timeout = config
            .request_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?;

        Ok(ClientSettings {
            base_url: config.base_url.clone(),
            credentials: Credentials::from_parts(
                config.api_token.as_deref(),
                config.username.as_deref(),
                config.password.as_deref(),
            ),
            verify_ssl: config.verify_ssl,
            timeout,
        })
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
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
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, nulls are ignored
fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.tenant, "main");
        assert_eq!(config.pagination.page_size, 100);
    }

    fn layer(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_layers_keep_unset_secrets() {
        let merged = ConfigLoader::merge_layers([
            layer("username: admin@kestra.io\npassword: admin1234\n"),
            layer("tenant: prod\napiToken: token\n"),
        ])
        .unwrap();

        assert_eq!(merged.tenant, "prod");
        assert_eq!(merged.username.as_deref(), Some("admin@kestra.io"));
        assert_eq!(merged.api_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_partial_explicit_file_keeps_root_values() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("config.yaml");
        let explicit = tmp.path().join("ops.yaml");
        let root_yaml = r#"
baseUrl: https://kestra.prod.example.com
tenant: prod
pagination:
  pageSize: 25
exports:
  kv: false
"#;
        std::fs::write(&root, root_yaml).unwrap();
        std::fs::write(&explicit, "username: ops@example.com\nexports:\n  iam: false\n").unwrap();

        let config = ConfigLoader::load_from(&root, Some(&explicit)).unwrap();

        assert_eq!(config.base_url, "https://kestra.prod.example.com");
        assert_eq!(config.tenant, "prod");
        assert_eq!(config.pagination.page_size, 25);
        assert!(!config.pagination.strict);
        assert!(!config.exports.kv);
        assert!(!config.exports.iam);
        assert!(config.exports.flows_bundle);
        assert_eq!(config.username.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_missing_root_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from(&tmp.path().join("absent.yaml"), None).unwrap();
        assert_eq!(config, ConfigLoader::load_defaults());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("KESTRA_EXPORT_TENANT", "staging"),
            ("KESTRA_EXPORT_PAGE_SIZE", "10"),
            ("KESTRA_EXPORT_STRICT_PAGINATION", "true"),
            ("KESTRA_EXPORT_API_TOKEN", "abc"),
        ]);

        let config = ConfigLoader::apply_env_overrides(Config::default(), |name| {
            env.get(name).map(|v| v.to_string())
        });

        assert_eq!(config.tenant, "staging");
        assert_eq!(config.pagination.page_size, 10);
        assert!(config.pagination.strict);
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_bad_env_page_size_is_ignored() {
        let config = ConfigLoader::apply_env_overrides(Config::default(), |name| {
            (name == "KESTRA_EXPORT_PAGE_SIZE").then(|| "lots".to_string())
        });
        assert_eq!(config.pagination.page_size, 100);
    }

    #[test]
    fn test_validate() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());

        let mut config = Config::default();
        config.pagination.page_size = 0;
        assert!(ConfigLoader::validate(&config).is_err());

        let config = Config {
            base_url: "::nope".to_string(),
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_err());

        let config = Config {
            request_timeout: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let config = Config {
            tenant: "prod".to_string(),
            ..Default::default()
        };

        ConfigLoader::save(&config, &path).unwrap();
        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let missing = PathBuf::from("/definitely/not/here/config.yaml");
        assert!(ConfigLoader::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_client_settings() {
        let config = Config {
            username: Some("admin".to_string()),
            password: Some("pw".to_string()),
            request_timeout: Some("30s".to_string()),
            ..Default::default()
        };
        let settings = ConfigLoader::client_settings(&config).unwrap();
        assert_eq!(settings.credentials.scheme(), "basic");
        assert_eq!(settings.timeout, Some(std::time::Duration::from_secs(30)));
    }
}
