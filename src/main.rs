//! kestra-export - export a running Kestra instance as Terraform inputs
//!
//! Walks the Kestra API (namespaces, flows, KV, namespace files, IAM) and
//! writes `kestra.tfvars` plus an `import.sh` of matching
//! `terraform import` commands.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cli::{ConfigSubcommand, RunArgs, TestClientArgs};

/// kestra-export - export a running Kestra instance as Terraform inputs
#[derive(Parser, Debug)]
#[command(name = "kestra-export")]
#[command(about = "Export a running Kestra instance into Terraform variables and import commands", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Export the instance
    Run(RunArgs),
    /// Check connectivity against a few endpoints
    TestClient(TestClientArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug, args.log_file.as_deref())?;
    if let Some(ref log_path) = log_file {
        eprintln!("Logs written to: {}", log_path.display());
    }

    tracing::debug!("Starting kestra-export {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Run(run) => cli::handle_run(run).await,
        Command::TestClient(test) => cli::handle_test_client(test).await,
        Command::Config { subcommand } => cli::handle_config_command(subcommand).await,
        Command::Version => {
            cli::display_version();
            Ok(())
        }
    }
}
