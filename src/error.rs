//! Error type shared across the crate.

use thiserror::Error;

/// Errors produced by graph construction and snapshot persistence.
///
/// Unresolved test references are never errors — they surface as edges with
/// `valid = false` in the repository. The variants here cover the genuinely
/// fatal cases: a class name the catalog has never seen, and snapshot I/O.
#[derive(Debug, Error)]
pub enum TestGraphError {
    /// A class under test or candidate test class is missing from the catalog.
    #[error("unknown class: {0} is not present in the catalog")]
    UnknownClass(String),

    /// Snapshot file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot content could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TestGraphError>;
