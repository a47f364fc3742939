//! Error types for the RefSync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.
//!
//! Classification and ordering are total functions and have no error type;
//! only document access, merging, and configuration can fail.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Version errors
// ---------------------------------------------------------------------------

/// Errors from parsing entity version strings.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The string is not a `major.minor.update` value.
    #[error("malformed version string: '{0}'")]
    Malformed(String),

    /// The document carries no version field at all.
    #[error("document has no version field")]
    MissingField,
}

// ---------------------------------------------------------------------------
// Document errors
// ---------------------------------------------------------------------------

/// Errors from resolving a reference to its document payload.
///
/// A document failure blocks resolution of the affected leaf only; it never
/// aborts tree construction or classification of unrelated leaves.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No payload exists for the reference on the requested side.
    #[error("no {side} document for reference {reference}")]
    Missing {
        side: String,
        reference: String,
    },

    /// The payload exists but could not be decoded.
    #[error("corrupt {side} document for reference {reference}: {detail}")]
    Corrupt {
        side: String,
        reference: String,
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Conflict errors
// ---------------------------------------------------------------------------

/// Errors from the conflict resolution subsystem.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// The leaf's document payload could not be resolved; the leaf stays
    /// unresolved.
    #[error("resolution blocked for {reference}: {source}")]
    ResolutionBlocked {
        reference: String,
        #[source]
        source: DocumentError,
    },

    /// The remote document's version string is malformed, so the merged
    /// version cannot be computed. The leaf stays unresolved.
    #[error("cannot compute merged version for {reference}: {source}")]
    MergedVersion {
        reference: String,
        #[source]
        source: VersionError,
    },

    /// A merge was requested for a node that is not a conflicted leaf.
    #[error("node is not a conflicted leaf: {0}")]
    NotAConflict(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
