//! Namespace fan-out for namespace-scoped kinds
//!
//! Namespaces are visited in the order the namespace collector returned
//! them, and children in the order their listing returned them. A failure
//! for one namespace skips that namespace for that kind only; a failure
//! for one KV key or file skips that item only.

use super::collectors::Collector;
use super::report::ExportReport;
use crate::models::{FileMeta, Flow, KvEntry, Namespace, ResourceKind};

/// Values keyed by namespace id, in visiting order
#[derive(Debug, Clone, PartialEq)]
pub struct PerNamespace<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for PerNamespace<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> PerNamespace<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: impl Into<String>, value: T) {
        self.entries.push((namespace.into(), value));
    }

    pub fn get(&self, namespace: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, value)| value)
    }

    /// Remove and return the value of a namespace
    pub fn take(&mut self, namespace: &str) -> Option<T> {
        let idx = self.entries.iter().position(|(ns, _)| ns == namespace)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.get(namespace).is_some()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(ns, _)| ns.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(ns, value)| (ns.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Files of one namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceFiles {
    /// Directory listing, as returned
    pub entries: Vec<FileMeta>,
    /// Downloaded contents as `(path, bytes)`, when content fetch is on
    pub contents: Vec<(String, Vec<u8>)>,
}

/// Drives per-namespace collection
pub struct Traversal<'c, 'a> {
    collector: &'c Collector<'a>,
}

impl<'c, 'a> Traversal<'c, 'a> {
    pub fn new(collector: &'c Collector<'a>) -> Self {
        Self { collector }
    }

    /// Flows of every namespace; failing namespaces are left out
    pub async fn flows_by_namespace(
        &self,
        namespaces: &[Namespace],
        report: &mut ExportReport,
    ) -> PerNamespace<Vec<Flow>> {
        let mut flows = PerNamespace::new();

        for ns in namespaces {
            match self.collector.flows_by_namespace(&ns.id).await {
                Ok(list) => {
                    report.record_count(ResourceKind::Flow, list.len());
                    flows.insert(&ns.id, list);
                }
                Err(e) => report.warn(
                    ResourceKind::Flow,
                    &ns.id,
                    format!("Failed to list flows for {}: {}", ns.id, e),
                ),
            }
        }

        flows
    }

    /// KV snapshot of every namespace
    ///
    /// Keys are listed first, then each value is fetched on its own. A
    /// namespace whose keys cannot be listed is left out; a key whose value
    /// cannot be fetched is left out of its namespace's snapshot.
    pub async fn kv_by_namespace(
        &self,
        namespaces: &[Namespace],
        report: &mut ExportReport,
    ) -> PerNamespace<Vec<KvEntry>> {
        let mut snapshots = PerNamespace::new();

        for ns in namespaces {
            report.progress(
                ResourceKind::KvEntry,
                format!("Exporting KV for namespace: {}", ns.id),
            );

            let keys = match self.collector.kv_keys(&ns.id).await {
                Ok(keys) => keys,
                Err(e) => {
                    report.warn(
                        ResourceKind::KvEntry,
                        &ns.id,
                        format!("Failed to list KV keys for {}: {}", ns.id, e),
                    );
                    continue;
                }
            };

            let mut entries = Vec::with_capacity(keys.len());
            for key in &keys {
                match self.collector.kv_value(&ns.id, key).await {
                    Ok(entry) => entries.push(entry),
                    Err(e) => report.warn(
                        ResourceKind::KvEntry,
                        format!("{}/{}", ns.id, key),
                        format!("Failed to fetch KV '{}' in ns '{}': {}", key, ns.id, e),
                    ),
                }
            }

            report.record_count(ResourceKind::KvEntry, entries.len());
            snapshots.insert(&ns.id, entries);
        }

        snapshots
    }

    /// File listings of every namespace, with contents when `fetch_content`
    pub async fn files_by_namespace(
        &self,
        namespaces: &[Namespace],
        fetch_content: bool,
        report: &mut ExportReport,
    ) -> PerNamespace<NamespaceFiles> {
        let mut files = PerNamespace::new();

        for ns in namespaces {
            report.progress(
                ResourceKind::NamespaceFile,
                format!("Exporting files for namespace: {}", ns.id),
            );

            let entries = match self.collector.namespace_files(&ns.id).await {
                Ok(entries) => entries,
                Err(e) => {
                    report.warn(
                        ResourceKind::NamespaceFile,
                        &ns.id,
                        format!("Failed to list files for {}: {}", ns.id, e),
                    );
                    continue;
                }
            };

            let mut contents = Vec::new();
            if fetch_content {
                for entry in entries
                    .iter()
                    .filter(|e| !e.file_name.is_empty() && !e.is_directory())
                {
                    match self
                        .collector
                        .namespace_file_content(&ns.id, &entry.file_name)
                        .await
                    {
                        Ok(bytes) => contents.push((entry.file_name.clone(), bytes)),
                        Err(e) => report.warn(
                            ResourceKind::NamespaceFile,
                            format!("{}/{}", ns.id, entry.file_name),
                            format!("Failed to fetch {} in {}: {}", entry.file_name, ns.id, e),
                        ),
                    }
                }
            }

            report.record_count(ResourceKind::NamespaceFile, entries.len());
            files.insert(&ns.id, NamespaceFiles { entries, contents });
        }

        files
    }
}
