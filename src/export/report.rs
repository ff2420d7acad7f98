//! Run-scoped warning sink
//!
//! One `ExportReport` lives for exactly one export run. Every isolated
//! failure goes through it: it is logged with `tracing`, echoed to the
//! operator console when enabled, and kept for the run summary and the
//! export manifest.

use crate::models::ResourceKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// A non-fatal problem tied to one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: ResourceKind,
    /// Identifier of the affected item (namespace id, KV key, ...)
    pub key: String,
    pub message: String,
}

/// A whole section that could not be exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFailure {
    pub kind: ResourceKind,
    pub message: String,
}

/// Warnings, failures and counts collected during one run
#[derive(Debug, Default, Serialize)]
pub struct ExportReport {
    warnings: Vec<Warning>,
    failures: Vec<SectionFailure>,
    counts: BTreeMap<&'static str, usize>,
    #[serde(skip)]
    console: bool,
}

impl ExportReport {
    /// Report that also writes to the operator console
    pub fn new() -> Self {
        Self {
            console: true,
            ..Default::default()
        }
    }

    /// Report that only logs (library use, tests)
    pub fn quiet() -> Self {
        Self::default()
    }

    /// Progress line for the operator
    pub fn progress(&self, kind: ResourceKind, message: impl AsRef<str>) {
        tracing::info!(kind = %kind, "{}", message.as_ref());
        if self.console {
            println!("[{}] {}", kind, message.as_ref());
        }
    }

    /// Record an isolated failure; the run goes on
    pub fn warn(&mut self, kind: ResourceKind, key: impl Into<String>, message: impl Into<String>) {
        let warning = Warning {
            kind,
            key: key.into(),
            message: message.into(),
        };

        tracing::warn!(kind = %warning.kind, key = %warning.key, "{}", warning.message);
        if self.console {
            eprintln!("[{}]   ! {}", warning.kind, warning.message);
        }

        self.warnings.push(warning);
    }

    /// Record that a whole section failed; the run goes on with the next one
    pub fn fail_section(&mut self, kind: ResourceKind, error: impl std::fmt::Display) {
        let failure = SectionFailure {
            kind,
            message: error.to_string(),
        };

        tracing::error!(kind = %failure.kind, "Section failed: {}", failure.message);
        if self.console {
            eprintln!("[{}] ! Failed: {}", failure.kind, failure.message);
        }

        self.failures.push(failure);
    }

    /// Count records exported for a kind (accumulates)
    pub fn record_count(&mut self, kind: ResourceKind, count: usize) {
        *self.counts.entry(kind.as_str()).or_default() += count;
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Warnings for one kind
    pub fn warnings_for(&self, kind: ResourceKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn failures(&self) -> &[SectionFailure] {
        &self.failures
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.counts.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }

    /// One-line summary for the end of a run
    pub fn summary(&self) -> String {
        let counts = self
            .counts
            .iter()
            .map(|(kind, n)| format!("{}={}", kind, n))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "exported [{}] with {} warning(s), {} failed section(s)",
            counts,
            self.warnings.len(),
            self.failures.len()
        )
    }
}
