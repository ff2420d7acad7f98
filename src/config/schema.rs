//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const REDACTED: &str = "****";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the Kestra instance
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Tenant id
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Basic auth username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// API token (takes precedence over basic auth)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Verify TLS certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Per-request timeout (e.g. "30s"); transport defaults when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,

    /// Directory the export is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Which optional sections to export
    #[serde(default)]
    pub exports: ExportsConfig,
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Keep paging until an empty page instead of stopping at a short one
    #[serde(default = "default_false")]
    pub strict: bool,
}

/// Optional export sections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportsConfig {
    /// Download the ZIP bundle of all flow sources
    #[serde(default = "default_true")]
    pub flows_bundle: bool,

    /// Snapshot KV entries per namespace
    #[serde(default = "default_true")]
    pub kv: bool,

    /// List namespace files per namespace
    #[serde(default = "default_true")]
    pub namespace_files: bool,

    /// Also download namespace file contents
    #[serde(default = "default_false")]
    pub namespace_file_content: bool,

    /// Users, groups, roles and service accounts
    #[serde(default = "default_true")]
    pub iam: bool,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_tenant() -> String {
    "main".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_page_size() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Config {
    /// Copy of this configuration with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| REDACTED.to_string());
        Self {
            password: mask(&self.password),
            api_token: mask(&self.api_token),
            ..self.clone()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tenant: default_tenant(),
            username: None,
            password: None,
            api_token: None,
            verify_ssl: default_true(),
            request_timeout: None,
            output_dir: default_output_dir(),
            pagination: PaginationConfig::default(),
            exports: ExportsConfig::default(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            strict: default_false(),
        }
    }
}

impl Default for ExportsConfig {
    fn default() -> Self {
        Self {
            flows_bundle: default_true(),
            kv: default_true(),
            namespace_files: default_true(),
            namespace_file_content: default_false(),
            iam: default_true(),
        }
    }
}
