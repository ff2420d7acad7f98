//! Complete export run
//!
//! Sections run in a fixed order and one after the other. A section that
//! fails is recorded and the run moves on; the artifacts are rendered and
//! written from whatever was collected.

use super::collectors::Collector;
use super::graph::ExportGraph;
use super::paginate::{PageTermination, Paginator};
use super::report::ExportReport;
use super::traversal::{NamespaceFiles, PerNamespace, Traversal};
use crate::client::RemoteApi;
use crate::config::Config;
use crate::models::{ExportRecord, KvEntry, ResourceKind};
use crate::output::{echo_artifact, OutputWriter};
use crate::render::{
    render_artifacts, Artifacts, Connection, IMPORT_SCRIPT_FILE, VARIABLES_FILE,
};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Instrument;

/// Name of the run manifest
pub const MANIFEST_FILE: &str = "export-manifest.json";

/// Optional sections of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub flows_bundle: bool,
    pub kv: bool,
    pub namespace_files: bool,
    pub namespace_file_content: bool,
    pub iam: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            flows_bundle: true,
            kv: true,
            namespace_files: true,
            namespace_file_content: false,
            iam: true,
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub tenant: String,
    pub page_size: u32,
    pub termination: PageTermination,
    pub sections: Sections,
    pub output_dir: PathBuf,
    pub connection: Connection,
    /// Print progress, warnings and the artifacts to the console
    pub echo: bool,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tenant: config.tenant.clone(),
            page_size: config.pagination.page_size,
            termination: PageTermination::from_strict(config.pagination.strict),
            sections: Sections {
                flows_bundle: config.exports.flows_bundle,
                kv: config.exports.kv,
                namespace_files: config.exports.namespace_files,
                namespace_file_content: config.exports.namespace_file_content,
                iam: config.exports.iam,
            },
            output_dir: config.output_dir.clone(),
            connection: Connection {
                base_url: config.base_url.clone(),
                username: config.username.clone(),
                password: config.password.clone(),
            },
            echo: true,
        }
    }
}

/// Result of a run
#[derive(Debug)]
pub struct ExportOutcome {
    pub graph: ExportGraph,
    pub artifacts: Artifacts,
    pub report: ExportReport,
    /// Files written, in order
    pub written: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    tenant: &'a str,
    base_url: &'a str,
    exported_at: String,
    version: &'static str,
    report: &'a ExportReport,
}

/// Drives an export against one API handle
pub struct Exporter<'a> {
    api: &'a dyn RemoteApi,
}

impl<'a> Exporter<'a> {
    pub fn new(api: &'a dyn RemoteApi) -> Self {
        Self { api }
    }

    /// Run every enabled section, then render and write the artifacts
    ///
    /// Only failures to write the artifacts themselves are returned as
    /// errors; everything else ends up in the report.
    pub async fn run(&self, options: &ExportOptions) -> Result<ExportOutcome> {
        let span = tracing::info_span!("export", tenant = %options.tenant);
        self.run_sections(options).instrument(span).await
    }

    async fn run_sections(&self, options: &ExportOptions) -> Result<ExportOutcome> {
        let mut report = if options.echo {
            ExportReport::new()
        } else {
            ExportReport::quiet()
        };
        let mut sink = Sink {
            writer: OutputWriter::new(&options.output_dir)?,
            written: Vec::new(),
        };

        let collector = Collector::new(
            self.api,
            &options.tenant,
            Paginator::new(options.page_size, options.termination),
        );
        let traversal = Traversal::new(&collector);

        // Namespaces
        let namespaces = match collector.namespaces(&mut report).await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                report.fail_section(ResourceKind::Namespace, e);
                Vec::new()
            }
        };
        sink.records(&mut report, None, &namespaces);

        // Flows, per namespace
        let flows = traversal.flows_by_namespace(&namespaces, &mut report).await;
        for (ns, list) in flows.iter() {
            sink.records(&mut report, Some(ns), list);
        }

        if options.sections.flows_bundle {
            self.flows_bundle(&collector, &sink.writer, &mut report, &mut sink.written)
                .await;
        }

        let kv = if options.sections.kv {
            let kv = traversal.kv_by_namespace(&namespaces, &mut report).await;
            for (ns, entries) in kv.iter() {
                sink.json(
                    &mut report,
                    ResourceKind::KvEntry,
                    ResourceKind::KvEntry.dump_path(Some(ns)),
                    &kv_snapshot(entries),
                );
            }
            Some(kv)
        } else {
            None
        };

        let files = if options.sections.namespace_files {
            let fetch_content = options.sections.namespace_file_content;
            let files = traversal
                .files_by_namespace(&namespaces, fetch_content, &mut report)
                .await;
            sink.namespace_files(&mut report, &files);
            Some(files)
        } else {
            None
        };

        if options.sections.iam {
            self.iam(&collector, &mut sink, &mut report).await;
        }

        // Artifacts
        let graph = ExportGraph::assemble(namespaces, flows, kv, files);
        let artifacts = render_artifacts(&options.connection, &graph);

        for issue in artifacts.inconsistencies() {
            tracing::error!("Rendered artifacts disagree: {}", issue);
        }

        if options.echo {
            echo_artifact(VARIABLES_FILE, &artifacts.variables);
        }
        let path = sink
            .writer
            .write_text(VARIABLES_FILE, &artifacts.variables)
            .with_context(|| format!("Failed to write {}", VARIABLES_FILE))?;
        sink.written.push(path);

        if options.echo {
            echo_artifact(IMPORT_SCRIPT_FILE, &artifacts.import_script);
        }
        let path = sink
            .writer
            .write_script(IMPORT_SCRIPT_FILE, &artifacts.import_script)
            .with_context(|| format!("Failed to write {}", IMPORT_SCRIPT_FILE))?;
        sink.written.push(path);

        let manifest = Manifest {
            tenant: &options.tenant,
            base_url: &options.connection.base_url,
            exported_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            report: &report,
        };
        match sink.writer.write_json(MANIFEST_FILE, &manifest) {
            Ok(path) => sink.written.push(path),
            Err(e) => tracing::warn!("Failed to write {}: {}", MANIFEST_FILE, e),
        }

        tracing::info!("{}", report.summary());

        Ok(ExportOutcome {
            graph,
            artifacts,
            report,
            written: sink.written,
        })
    }

    async fn flows_bundle(
        &self,
        collector: &Collector<'_>,
        writer: &OutputWriter,
        report: &mut ExportReport,
        written: &mut Vec<PathBuf>,
    ) {
        let name = Path::new(ResourceKind::FlowBundle.file_stem()).with_extension("zip");
        let target = match writer.path(&name) {
            Ok(target) => target,
            Err(e) => {
                report.fail_section(ResourceKind::FlowBundle, e);
                return;
            }
        };

        match collector.export_flows_bundle(&target).await {
            Ok(path) => {
                report.progress(
                    ResourceKind::FlowBundle,
                    format!("Flows ZIP saved to {}", path.display()),
                );
                report.record_count(ResourceKind::FlowBundle, 1);
                written.push(path);
            }
            Err(e) => report.fail_section(ResourceKind::FlowBundle, e),
        }
    }

    async fn iam(&self, collector: &Collector<'_>, sink: &mut Sink, report: &mut ExportReport) {
        match collector.users().await {
            Ok(users) => sink.records(report, None, &users),
            Err(e) => report.fail_section(ResourceKind::User, e),
        }

        match collector.groups().await {
            Ok(groups) => sink.records(report, None, &groups),
            Err(e) => report.fail_section(ResourceKind::Group, e),
        }

        match collector.roles().await {
            Ok(roles) => sink.records(report, None, &roles),
            Err(e) => report.fail_section(ResourceKind::Role, e),
        }

        let accounts = collector.service_accounts(report).await;
        sink.records(report, None, &accounts);
    }
}

/// KV entries as written to `kv/<ns>.json`, in listing order
fn kv_snapshot(entries: &[KvEntry]) -> Vec<Value> {
    entries.iter().map(ExportRecord::to_json).collect()
}

/// Side-export writes; failures become warnings
struct Sink {
    writer: OutputWriter,
    written: Vec<PathBuf>,
}

impl Sink {
    fn json<T: Serialize + ?Sized>(
        &mut self,
        report: &mut ExportReport,
        kind: ResourceKind,
        relative: impl AsRef<Path>,
        value: &T,
    ) {
        let relative = relative.as_ref();
        match self.writer.write_json(relative, value) {
            Ok(path) => self.written.push(path),
            Err(e) => report.warn(
                kind,
                relative.display().to_string(),
                format!("Failed to write {}: {}", relative.display(), e),
            ),
        }
    }

    /// Write the dump of one kind
    ///
    /// Namespace-scoped kinds are counted by the traversal, everything
    /// else is counted here.
    fn records<R: ExportRecord>(
        &mut self,
        report: &mut ExportReport,
        namespace: Option<&str>,
        records: &[R],
    ) {
        if !R::KIND.is_namespace_scoped() {
            report.record_count(R::KIND, records.len());
        }
        let values: Vec<Value> = records.iter().map(ExportRecord::to_json).collect();
        self.json(report, R::KIND, R::KIND.dump_path(namespace), &values);
    }

    fn namespace_files(&mut self, report: &mut ExportReport, files: &PerNamespace<NamespaceFiles>) {
        for (ns, ns_files) in files.iter() {
            let dir = Path::new(ResourceKind::NamespaceFile.file_stem()).join(ns);
            let index: Vec<Value> = ns_files.entries.iter().map(ExportRecord::to_json).collect();
            self.json(report, ResourceKind::NamespaceFile, dir.join("_index.json"), &index);

            for (path, bytes) in &ns_files.contents {
                let relative = dir.join(path.trim_start_matches('/'));
                match self.writer.write_bytes(&relative, bytes) {
                    Ok(written) => self.written.push(written),
                    Err(e) => report.warn(
                        ResourceKind::NamespaceFile,
                        format!("{}/{}", ns, path),
                        format!("Failed to write {} in {}: {}", path, ns, e),
                    ),
                }
            }
        }
    }
}

