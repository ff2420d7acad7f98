//! Aggregated export graph
//!
//! Namespaces in collection order, each carrying what was collected for
//! it. Built once per run and only read afterwards.

use super::traversal::{NamespaceFiles, PerNamespace};
use crate::models::{Flow, KvEntry, Namespace};

/// One namespace and its collected children
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceNode {
    pub namespace: Namespace,
    /// `None` when the flows of this namespace could not be listed
    pub flows: Option<Vec<Flow>>,
    /// `None` when KV was not exported or could not be listed
    pub kv: Option<Vec<KvEntry>>,
    /// `None` when files were not exported or could not be listed
    pub files: Option<NamespaceFiles>,
}

impl NamespaceNode {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            flows: None,
            kv: None,
            files: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.namespace.id
    }
}

/// Root of the export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportGraph {
    pub namespaces: Vec<NamespaceNode>,
}

impl ExportGraph {
    /// Attach per-namespace collections to their namespaces
    ///
    /// Namespace order is preserved and nothing is deduplicated; entries
    /// for namespaces not in `namespaces` are dropped.
    pub fn assemble(
        namespaces: Vec<Namespace>,
        mut flows: PerNamespace<Vec<Flow>>,
        mut kv: Option<PerNamespace<Vec<KvEntry>>>,
        mut files: Option<PerNamespace<NamespaceFiles>>,
    ) -> Self {
        let namespaces = namespaces
            .into_iter()
            .map(|namespace| {
                let id = namespace.id.clone();
                NamespaceNode {
                    flows: flows.take(&id),
                    kv: kv.as_mut().and_then(|m| m.take(&id)),
                    files: files.as_mut().and_then(|m| m.take(&id)),
                    namespace,
                }
            })
            .collect();

        Self { namespaces }
    }

    /// Namespace ids in order
    pub fn namespace_ids(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(NamespaceNode::id)
    }

    /// `(namespace, flow)` pairs in order, skipping namespaces without flows
    pub fn flow_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces.iter().flat_map(|node| {
            node.flows
                .iter()
                .flatten()
                .map(move |flow| (node.id(), flow.id.as_str()))
        })
    }

    pub fn flow_count(&self) -> usize {
        self.namespaces
            .iter()
            .filter_map(|node| node.flows.as_ref())
            .map(Vec::len)
            .sum()
    }
}
