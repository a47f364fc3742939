//! Lazy document access.
//!
//! The core never caches entity payloads. When a resolution step needs the
//! full document behind a leaf, it asks a [`DocumentStore`] for it on demand;
//! the version-control layer implements the trait over its object store.

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::DocumentError;
use crate::models::{Reference, Side};

/// Resolves `(side, reference)` to the full entity document.
///
/// Documents are key/value trees equivalent to JSON objects. A missing or
/// undecodable payload is reported per leaf; it must not abort work on
/// unrelated references.
pub trait DocumentStore {
    /// Fetch the document for `reference` as it exists on `side`.
    fn document(&self, side: Side, reference: &Reference) -> Result<Value, DocumentError>;
}

/// In-memory [`DocumentStore`] backed by a map.
///
/// Used by tests and by callers that already hold the materialized payloads
/// for a session snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<(Side, Reference), Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the document for `reference` on `side`.
    pub fn put(&mut self, side: Side, reference: Reference, document: Value) {
        self.documents.insert((side, reference), document);
    }

    /// Remove the document for `reference` on `side`, if present.
    pub fn remove(&mut self, side: Side, reference: &Reference) -> Option<Value> {
        self.documents.remove(&(side, reference.clone()))
    }
}

impl DocumentStore for MemoryStore {
    fn document(&self, side: Side, reference: &Reference) -> Result<Value, DocumentError> {
        self.documents
            .get(&(side, reference.clone()))
            .cloned()
            .ok_or_else(|| DocumentError::Missing {
                side: side.to_string(),
                reference: reference.to_string(),
            })
    }
}
