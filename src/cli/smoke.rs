//! `test-client` command: connectivity smoke test
//!
//! Exercises a handful of endpoints against a live instance and prints
//! what came back. Failures are printed and the next call still runs.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::export::ConnectionArgs;
use kestra_export::client::RemoteApi;
use kestra_export::models::{ExportRecord, Flow, FlowRef};

/// Arguments of the `test-client` command
#[derive(Args, Debug, Clone)]
pub struct TestClientArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Namespace whose flows are listed and exported
    #[arg(long, default_value = "company.team")]
    pub namespace: String,

    /// Where the exported flows ZIP is written (default: `<outputDir>/export.zip`)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn handle_test_client(args: TestClientArgs) -> Result<()> {
    let config = args.connection.resolve()?;
    let api = ConnectionArgs::client(&config)?;
    let tenant = config.tenant.as_str();
    let size = config.pagination.page_size;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir.join("export.zip"));

    match api.health_check(tenant).await {
        Ok(()) => println!("Connected to {} (tenant {})", config.base_url, tenant),
        Err(e) => eprintln!("Health check failed: {}", e),
    }

    println!("\nFlows in {}:", args.namespace);
    match api.list_flows(tenant, &args.namespace).await {
        Ok(flows) => {
            for flow in &flows {
                println!("  {}: {}", flow.namespace, flow.id);
            }
            let ids: Vec<FlowRef> = flows.iter().map(Flow::flow_ref).collect();
            export_by_ids(&api, tenant, &ids, &output).await;
        }
        Err(e) => eprintln!("Error listing flows: {}", e),
    }

    println!("\nUsers (page 1):");
    match api.list_users(1, size).await {
        Ok(users) => {
            for user in &users {
                println!("  - {}", user.record_id());
            }
        }
        Err(e) => eprintln!("Error listing users: {}", e),
    }

    println!("\nGroups (page 1):");
    match api.list_groups(tenant, 1, size).await {
        Ok(groups) => {
            for group in &groups {
                println!("  - {}", group.name);
            }
        }
        Err(e) => eprintln!("Error listing groups: {}", e),
    }

    Ok(())
}

async fn export_by_ids(api: &dyn RemoteApi, tenant: &str, ids: &[FlowRef], output: &Path) {
    if ids.is_empty() {
        println!("No flows to export");
        return;
    }

    match api.export_flows_by_ids(tenant, ids).await {
        Ok(bytes) => match output
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(output, &bytes))
        {
            Ok(()) => println!("Exported {} flow(s) to {}", ids.len(), output.display()),
            Err(e) => eprintln!("Error writing {}: {}", output.display(), e),
        },
        Err(e) => eprintln!("Error exporting flows: {}", e),
    }
}
