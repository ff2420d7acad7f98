//! Kestra resource records
//!
//! Each record keeps the attributes the exporter reasons about as typed
//! fields and carries everything else through `extra`, so a record written
//! back out as JSON loses nothing the server sent.

use super::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Explicit serialization interface implemented by every exported record
pub trait ExportRecord: Serialize {
    /// Kind this record belongs to
    const KIND: ResourceKind;

    /// Stable identifier of the record within its collection
    fn record_id(&self) -> String;

    /// Structural JSON form, used for the per-kind JSON dumps
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Secret isolation settings of a namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretIsolation {
    #[serde(default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A namespace as returned by the namespace search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_isolation: Option<SecretIsolation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Namespace {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret_isolation: None,
            extra: Map::new(),
        }
    }

    /// Mark secret isolation as enabled (builder style)
    pub fn with_secret_isolation(mut self, enabled: bool) -> Self {
        self.secret_isolation = Some(SecretIsolation {
            enabled,
            extra: Map::new(),
        });
        self
    }

    pub fn secret_isolation_enabled(&self) -> bool {
        self.secret_isolation
            .as_ref()
            .map(|iso| iso.enabled)
            .unwrap_or(false)
    }
}

impl ExportRecord for Namespace {
    const KIND: ResourceKind = ResourceKind::Namespace;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// A flow definition; only meaningful inside its owning namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub namespace: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flow {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            extra: Map::new(),
        }
    }

    pub fn flow_ref(&self) -> FlowRef {
        FlowRef {
            namespace: self.namespace.clone(),
            id: self.id.clone(),
        }
    }
}

impl ExportRecord for Flow {
    const KIND: ResourceKind = ResourceKind::Flow;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// `(namespace, id)` pair used to export selected flows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRef {
    pub namespace: String,
    pub id: String,
}

/// An instance user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportRecord for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn record_id(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_default()
    }
}

/// A tenant group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportRecord for Group {
    const KIND: ResourceKind = ResourceKind::Group;

    fn record_id(&self) -> String {
        self.name.clone()
    }
}

/// A tenant role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportRecord for Role {
    const KIND: ResourceKind = ResourceKind::Role;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// An instance service account (superadmin endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportRecord for ServiceAccount {
    const KIND: ResourceKind = ResourceKind::ServiceAccount;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// A namespace-scoped key/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
}

impl ExportRecord for KvEntry {
    const KIND: ResourceKind = ResourceKind::KvEntry;

    fn record_id(&self) -> String {
        self.key.clone()
    }
}

/// Metadata of one entry in a namespace's file tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    #[serde(default)]
    pub file_name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMeta {
    pub fn is_directory(&self) -> bool {
        self.entry_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("directory"))
    }
}

impl ExportRecord for FileMeta {
    const KIND: ResourceKind = ResourceKind::NamespaceFile;

    fn record_id(&self) -> String {
        self.file_name.clone()
    }
}
