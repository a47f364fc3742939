//! RefSync core library.
//!
//! This crate is the diff-tree and conflict-resolution engine of the RefSync
//! collaboration layer: it pairs the local and remote change records a
//! version-control layer supplies, arranges them into a comparison tree,
//! classifies each leaf's overlay state, and applies user or policy decisions
//! to produce merged payloads for the commit step.
//!
//! The crate performs no I/O of its own: document payloads are fetched
//! lazily through the [`document::DocumentStore`] seam, and transport,
//! object storage, and persistence stay with the surrounding layers.

pub mod config;
pub mod conflict;
pub mod diff;
pub mod document;
pub mod errors;
pub mod models;
pub mod version;

// Re-exports for convenience.
pub use config::CollabConfig;
pub use conflict::{CompareSession, ConflictResolution, ConflictResolutionMap};
pub use diff::{DiffResult, DiffTree, Overlay};
pub use document::DocumentStore;
pub use errors::CoreError;
pub use models::{Diff, DiffType, EntityType, Reference, Side};
pub use version::Version;
