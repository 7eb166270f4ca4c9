//! Error types for heapstore
//!
//! Provides a unified error type for all operations.
//!
//! Domain outcomes are deliberately *not* errors: a duplicate primary key on
//! insert and a missing key on delete/lookup are reported through `bool` /
//! `Option` return values. Errors are reserved for structural, capacity, and
//! usage violations that terminate the operation.

use thiserror::Error;

/// Result type alias using HeapError
pub type Result<T> = std::result::Result<T, HeapError>;

/// Unified error type for heapstore operations
#[derive(Debug, Error)]
pub enum HeapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // File Format Errors
    // -------------------------------------------------------------------------
    #[error("invalid database file: {0}")]
    InvalidFormat(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Schema / Usage Errors
    // -------------------------------------------------------------------------
    #[error("schema error: {0}")]
    Schema(String),

    #[error("field '{0}' not in schema")]
    UnknownField(String),

    #[error("field '{field}' is not of integer type")]
    FieldTypeMismatch { field: String },

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("database is full: block bitmap capacity exhausted")]
    DatabaseFull,

    // -------------------------------------------------------------------------
    // Unsupported Operations
    // -------------------------------------------------------------------------
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
