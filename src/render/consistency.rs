//! Cross-check of the two rendered artifacts
//!
//! Reads the namespace list and the `flows_by_namespace` map back out of
//! the variables buffer, reads every import line out of the script, and
//! reports entries present on one side only.

use std::collections::BTreeMap;
use std::fmt;

/// Resource a line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Namespace,
    Flow,
}

/// A mismatch between the variables file and the import script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Declared in the variables but never imported
    MissingImport { target: Target, key: String },
    /// Imported but not declared in the variables
    OrphanImport { target: Target, key: String },
    /// An import line whose address and path do not match
    Mismatch { line: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::MissingImport { target, key } => {
                write!(f, "{:?} '{}' has no import line", target, key)
            }
            Inconsistency::OrphanImport { target, key } => {
                write!(f, "{:?} '{}' is imported but not declared", target, key)
            }
            Inconsistency::Mismatch { line } => write!(f, "malformed import line: {}", line),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Block {
    None,
    Namespaces,
    Flows,
}

fn quoted(line: &str, suffix: &str) -> Option<String> {
    line.trim_start()
        .strip_prefix('"')?
        .strip_suffix(suffix)
        .map(str::to_string)
}

/// `(target, key)` entries declared by the variables buffer
fn declared(variables: &str) -> Vec<(Target, String)> {
    let mut entries = Vec::new();
    let mut block = Block::None;
    let mut current_ns: Option<String> = None;

    for line in variables.lines() {
        match (block, line.trim_end()) {
            (Block::None, "namespaces = [") => block = Block::Namespaces,
            (Block::None, "flows_by_namespace = {") => block = Block::Flows,
            (Block::Namespaces, "]") | (Block::Flows, "}") => block = Block::None,
            (Block::Namespaces, l) => {
                if let Some(ns) = quoted(l, "\",") {
                    entries.push((Target::Namespace, ns));
                }
            }
            (Block::Flows, "  ]") => current_ns = None,
            (Block::Flows, l) => {
                if let Some(ns) = quoted(l, "\" = [") {
                    current_ns = Some(ns);
                } else if let (Some(ns), Some(flow)) = (&current_ns, quoted(l, "\",")) {
                    entries.push((Target::Flow, format!("{}|{}", ns, flow)));
                }
            }
            _ => {}
        }
    }

    entries
}

/// `(target, key)` entries imported by the script, plus malformed lines
fn imported(script: &str) -> (Vec<(Target, String)>, Vec<String>) {
    let mut entries = Vec::new();
    let mut malformed = Vec::new();

    for line in script.lines().filter(|l| l.starts_with("terraform import ")) {
        let (Some(open), Some(close)) = (line.find('\''), line.rfind('\'')) else {
            malformed.push(line.to_string());
            continue;
        };
        if open >= close {
            malformed.push(line.to_string());
            continue;
        }

        let address = &line[open + 1..close];
        let path = line[close + 1..].trim();

        let parsed = if let Some(rest) = address.strip_prefix("kestra_namespace.namespaces[\"") {
            rest.strip_suffix("\"]")
                .filter(|key| *key == path)
                .map(|key| (Target::Namespace, key.to_string()))
        } else if let Some(rest) = address.strip_prefix("kestra_flow.flows[\"") {
            rest.strip_suffix("\"]")
                .filter(|key| key.replacen('|', "/", 1) == path)
                .map(|key| (Target::Flow, key.to_string()))
        } else {
            None
        };

        match parsed {
            Some(entry) => entries.push(entry),
            None => malformed.push(line.to_string()),
        }
    }

    (entries, malformed)
}

/// Compare both buffers as multisets of entries
pub(super) fn check(variables: &str, script: &str) -> Vec<Inconsistency> {
    let mut balance: BTreeMap<(Target, String), i64> = BTreeMap::new();

    for entry in declared(variables) {
        *balance.entry(entry).or_default() += 1;
    }

    let (entries, malformed) = imported(script);
    for entry in entries {
        *balance.entry(entry).or_default() -= 1;
    }

    let mut issues: Vec<Inconsistency> = malformed
        .into_iter()
        .map(|line| Inconsistency::Mismatch { line })
        .collect();

    for ((target, key), n) in balance {
        for _ in 0..n.max(0) {
            issues.push(Inconsistency::MissingImport {
                target,
                key: key.clone(),
            });
        }
        for _ in 0..(-n).max(0) {
            issues.push(Inconsistency::OrphanImport {
                target,
                key: key.clone(),
            });
        }
    }

    issues
}
