//! Terraform artifact rendering
//!
//! Turns the export graph into two coupled text buffers:
//!
//! - `kestra.tfvars`: connection settings, the namespace list and the
//!   flows of each namespace
//! - `import.sh`: one `terraform import` line per namespace and per flow
//!
//! Every namespace in the variables has exactly one namespace import line
//! and every `(namespace, flow)` pair has exactly one flow import line,
//! addressed as `"<ns>|<flow>"` and targeting `<ns>/<flow>`.
//!
//! Values are inserted between quotes as-is. Quote characters inside ids
//! or credentials are not escaped.

mod consistency;

pub use consistency::Inconsistency;

use crate::export::ExportGraph;
use std::fmt::Write;

/// File name of the variables artifact
pub const VARIABLES_FILE: &str = "kestra.tfvars";
/// File name of the import script artifact
pub const IMPORT_SCRIPT_FILE: &str = "import.sh";

/// Connection settings written into the variables file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The rendered artifact pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub variables: String,
    pub import_script: String,
}

impl Artifacts {
    /// Pairs between the two buffers that do not line up
    pub fn inconsistencies(&self) -> Vec<Inconsistency> {
        consistency::check(&self.variables, &self.import_script)
    }
}

fn namespace_import(ns: &str) -> String {
    format!(
        "terraform import -var-file={} 'kestra_namespace.namespaces[\"{}\"]' {}\n",
        VARIABLES_FILE, ns, ns
    )
}

fn flow_import(ns: &str, flow: &str) -> String {
    format!(
        "terraform import -var-file={} 'kestra_flow.flows[\"{}|{}\"]' {}/{}\n",
        VARIABLES_FILE, ns, flow, ns, flow
    )
}

/// Render both artifacts from the graph
///
/// Namespaces whose flows could not be listed get their namespace entry
/// and import line but no `flows_by_namespace` entry.
pub fn render_artifacts(connection: &Connection, graph: &ExportGraph) -> Artifacts {
    let mut vars = String::new();
    let mut script = String::new();

    // String formatting into a String cannot fail
    let _ = writeln!(vars, "kestra_base_url = \"{}\"", connection.base_url);
    let _ = writeln!(
        vars,
        "kestra_username = \"{}\"",
        connection.username.as_deref().unwrap_or_default()
    );
    let _ = writeln!(
        vars,
        "kestra_password = \"{}\"",
        connection.password.as_deref().unwrap_or_default()
    );
    vars.push('\n');

    // namespaces
    vars.push_str("namespaces = [\n");
    script.push_str("#!/bin/bash\n\n");
    for node in &graph.namespaces {
        let _ = writeln!(vars, "  \"{}\",", node.id());
        script.push_str(&namespace_import(node.id()));
    }
    vars.push_str("]\n\n");
    script.push('\n');

    // flows by namespace
    vars.push_str("flows_by_namespace = {\n");
    for node in &graph.namespaces {
        let Some(flows) = &node.flows else {
            continue;
        };

        let _ = writeln!(vars, "  \"{}\" = [", node.id());
        for flow in flows {
            let _ = writeln!(vars, "    \"{}\",", flow.id);
            script.push_str(&flow_import(node.id(), &flow.id));
        }
        vars.push_str("  ]\n");
    }
    vars.push_str("}\n\n");

    Artifacts {
        variables: vars,
        import_script: script,
    }
}
