use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("could not create directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a record with Serial No {0} already exists")]
    DuplicateKey(i64),

    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

// Raised while turning form input into a record, never by the store itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required! ({0} is empty)")]
    MissingField(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be a date like 2024-01-31, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be a time like 09:30, got '{value}'")]
    InvalidTime { field: &'static str, value: String },
}
