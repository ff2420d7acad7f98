//! Exported resource kind definitions
//!
//! Centralizes the kinds of Kestra resources the exporter collects so
//! warnings, output file names and section labels never drift apart.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Enumeration of every resource kind the exporter knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Tenant-scoped parents
    Namespace,
    // Namespace-scoped children
    Flow,
    FlowBundle,
    KvEntry,
    NamespaceFile,
    // Identity and access
    User,
    Group,
    Role,
    ServiceAccount,
}

impl ResourceKind {
    /// Section label, as shown in console output (`[kv] ...`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Flow => "flows",
            ResourceKind::FlowBundle => "flows-bundle",
            ResourceKind::KvEntry => "kv",
            ResourceKind::NamespaceFile => "namespace-files",
            ResourceKind::User => "users",
            ResourceKind::Group => "groups",
            ResourceKind::Role => "roles",
            ResourceKind::ServiceAccount => "service-accounts",
        }
    }

    /// Base name used for files and directories written for this kind
    pub fn file_stem(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Flow => "flows",
            ResourceKind::FlowBundle => "flows",
            ResourceKind::KvEntry => "kv",
            ResourceKind::NamespaceFile => "namespace_files",
            ResourceKind::User => "users",
            ResourceKind::Group => "groups",
            ResourceKind::Role => "roles",
            ResourceKind::ServiceAccount => "service_accounts",
        }
    }

    /// Whether records of this kind only exist inside a namespace
    pub fn is_namespace_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::Flow | ResourceKind::KvEntry | ResourceKind::NamespaceFile
        )
    }

    /// Relative path of the JSON dump for this kind
    ///
    /// Namespace-scoped kinds get one file per namespace under their stem;
    /// other kinds ignore `namespace`.
    pub fn dump_path(&self, namespace: Option<&str>) -> PathBuf {
        match namespace {
            Some(ns) if self.is_namespace_scoped() => {
                Path::new(self.file_stem()).join(format!("{}.json", ns))
            }
            _ => PathBuf::from(format!("{}.json", self.file_stem())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
