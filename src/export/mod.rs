//! Export engine
//!
//! Walks the Kestra API and builds the in-memory export graph:
//!
//! - `paginate` - page-by-page traversal of list endpoints
//! - `collectors` - one collector per resource kind
//! - `traversal` - namespace fan-out for namespace-scoped kinds
//! - `graph` - the aggregated namespaces → flows graph
//! - `report` - run-scoped warnings and counts
//! - `run` - drives a complete export

pub mod collectors;
pub mod graph;
pub mod paginate;
pub mod report;
pub mod run;
pub mod traversal;

pub use collectors::Collector;
pub use graph::{ExportGraph, NamespaceNode};
pub use paginate::{PageRequest, PageTermination, Paginator};
pub use report::{ExportReport, SectionFailure, Warning};
pub use run::{ExportOptions, ExportOutcome, Exporter, Sections};
pub use traversal::{NamespaceFiles, PerNamespace, Traversal};

use crate::client::ApiError;
use std::path::{Path, PathBuf};

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("page {page} returned {returned} records, more than the requested {size}")]
    OversizedPage { page: u32, size: u32, returned: usize },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
