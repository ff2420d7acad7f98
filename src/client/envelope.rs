//! Response envelopes
//!
//! Kestra list endpoints answer either with a paged wrapper
//! (`{"results": [...], "total": n}`) or with a bare JSON array. The
//! variant is resolved here, once, so callers only ever see items.

use serde::Deserialize;

/// A list response in one of the two shapes the API uses
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged {
        results: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paged { results, .. } => results,
            Listing::Bare(items) => items,
        }
    }

    /// Total advertised by the server, when the envelope carries one
    pub fn total(&self) -> Option<u64> {
        match self {
            Listing::Paged { total, .. } => *total,
            Listing::Bare(_) => None,
        }
    }
}

/// One item of a KV key listing: a plain key or a described entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum KeyItem {
    Name(String),
    Entry { key: String },
}

impl KeyItem {
    pub fn into_key(self) -> String {
        match self {
            KeyItem::Name(key) | KeyItem::Entry { key } => key,
        }
    }
}
