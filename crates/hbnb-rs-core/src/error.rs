//! Error types for record reconstruction and storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or mutating a record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A timestamp field did not match the persisted layout.
    #[error("invalid timestamp for {field}: {value:?} ({source})")]
    InvalidTimestamp {
        field: String,
        value: String,
        source: chrono::ParseError,
    },
    /// A fixed field carried the wrong JSON type.
    #[error("invalid value for {field}: expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
    /// Attribute values are limited to strings, numbers and booleans.
    #[error("unsupported value for attribute {field}: {found}")]
    UnsupportedValue { field: String, found: &'static str },
    /// Fixed fields cannot be assigned through the attribute bag.
    #[error("attribute {0} is reserved")]
    ReservedAttribute(String),
}

/// Reasons a single stored entry is skipped during reload.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry is not an object")]
    NotAnObject,
    #[error("missing __class__ discriminator")]
    MissingClass,
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Errors returned by the file storage engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The backing file parsed but does not hold a key/entry object.
    #[error("corrupt storage file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    /// Type name is not in the type registry.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// No record is stored under the key.
    #[error("unknown key: {0}")]
    UnknownKey(String),
    /// Record validation error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}
