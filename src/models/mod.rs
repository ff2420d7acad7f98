//! Kestra model layer
//!
//! Rust types for the Kestra resources the exporter reads.
//!
//! Structure:
//! - `resource_kind.rs` - Kinds of exported resources
//! - `records.rs` - Record types and the `ExportRecord` interface

pub mod records;
pub mod resource_kind;

pub use records::{
    ExportRecord, FileMeta, Flow, FlowRef, Group, KvEntry, Namespace, Role, SecretIsolation,
    ServiceAccount, User,
};
pub use resource_kind::ResourceKind;
