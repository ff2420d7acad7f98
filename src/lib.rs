//! kestra-export library
//!
//! Exports a running Kestra instance into Terraform variables and import
//! commands. Used by the `kestra-export` binary and by the integration
//! tests.

pub mod client;
pub mod config;
pub mod export;
pub mod models;
pub mod output;
pub mod render;

// Re-export commonly used types for convenience
pub use client::{ApiError, ApiResult, Credentials, HttpRemoteApi, RemoteApi};
pub use export::{ExportError, ExportGraph, ExportOptions, ExportOutcome, ExportReport, Exporter};
pub use render::{render_artifacts, Artifacts, Connection};
