//! `run` command: a complete export

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use kestra_export::client::HttpRemoteApi;
use kestra_export::config::{Config, ConfigLoader};
use kestra_export::export::{ExportOptions, Exporter};

/// Where the instance is and how to authenticate
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Kestra base URL (e.g. http://localhost:8080)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Tenant to export
    #[arg(long)]
    pub tenant: Option<String>,

    /// Basic auth username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long)]
    pub password: Option<String>,

    /// API token (takes precedence over basic auth)
    #[arg(long)]
    pub api_token: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Configuration file layered on the root configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Load the layered configuration and apply these flags on top
    pub fn resolve(&self) -> Result<Config> {
        let config = self.load()?;
        ConfigLoader::validate(&config).context("Invalid configuration")?;
        Ok(config)
    }

    /// Layered configuration with these flags applied, not yet validated
    fn load(&self) -> Result<Config> {
        let mut config =
            ConfigLoader::load(self.config.as_deref()).context("Failed to load configuration")?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(tenant) = &self.tenant {
            config.tenant = tenant.clone();
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        if self.api_token.is_some() {
            config.api_token = self.api_token.clone();
        }
        if self.insecure {
            config.verify_ssl = false;
        }
    }

    /// Build the HTTP client for a resolved configuration
    pub fn client(config: &Config) -> Result<HttpRemoteApi> {
        let settings = ConfigLoader::client_settings(config)?;
        tracing::debug!(
            "Connecting to {} ({} auth)",
            settings.base_url,
            settings.credentials.scheme()
        );
        HttpRemoteApi::new(&settings).context("Failed to create Kestra client")
    }
}

/// Arguments of the `run` command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Directory receiving every exported file
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Records requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Keep paging until an empty page instead of stopping at a short one
    #[arg(long)]
    pub strict_pagination: bool,

    /// Skip the flows ZIP bundle
    #[arg(long)]
    pub no_flows_bundle: bool,

    /// Skip the KV snapshot
    #[arg(long)]
    pub no_kv: bool,

    /// Skip namespace file listings
    #[arg(long)]
    pub no_namespace_files: bool,

    /// Download namespace file contents as well
    #[arg(long, conflicts_with = "no_namespace_files")]
    pub with_file_content: bool,

    /// Skip users, groups, roles and service accounts
    #[arg(long)]
    pub no_iam: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(size) = self.page_size {
            config.pagination.page_size = size;
        }
        if self.strict_pagination {
            config.pagination.strict = true;
        }
        if self.no_flows_bundle {
            config.exports.flows_bundle = false;
        }
        if self.no_kv {
            config.exports.kv = false;
        }
        if self.no_namespace_files {
            config.exports.namespace_files = false;
            config.exports.namespace_file_content = false;
        }
        if self.with_file_content {
            config.exports.namespace_file_content = true;
        }
        if self.no_iam {
            config.exports.iam = false;
        }
    }

    /// Resolved configuration with every flag applied
    pub fn resolve(&self) -> Result<Config> {
        self.finish(self.connection.load()?)
    }

    /// Apply the run flags, then validate the result once
    fn finish(&self, mut config: Config) -> Result<Config> {
        self.apply(&mut config);
        ConfigLoader::validate(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

/// Run a complete export
pub async fn handle_run(args: RunArgs) -> Result<()> {
    let config = args.resolve()?;
    let api = ConnectionArgs::client(&config)?;
    let options = ExportOptions::from_config(&config);

    println!(
        "Exporting {} (tenant {}) into {}",
        config.base_url,
        config.tenant,
        config.output_dir.display()
    );

    let outcome = Exporter::new(&api).run(&options).await?;

    println!("\n{}", outcome.report.summary());
    for failure in outcome.report.failures() {
        println!("  failed: {} ({})", failure.kind, failure.message);
    }
    println!(
        "{} file(s) written to {}",
        outcome.written.len(),
        config.output_dir.display()
    );

    Ok(())
}
