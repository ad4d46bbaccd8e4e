//! Core error types for bewet-core.
//!
//! This module defines the error hierarchy using thiserror. Invalid user
//! input (a zero amount, an unknown entry id) is deliberately NOT part of
//! this hierarchy: per the tracker's fail-quiet policy those cases are
//! handled as silent no-ops. Everything here is either a storage failure
//! or a settings value the engine refuses to persist.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bewet-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Settings validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Export/import document errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A persisted singleton record contains JSON the engine cannot read
    #[error("Corrupt record '{key}': {message}")]
    CorruptRecord { key: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Settings validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Daily goal must be a positive volume
    #[error("Daily goal must be greater than 0 ml (got {0})")]
    NonPositiveGoal(u32),

    /// Reminder window bounds must be a valid time of day
    #[error("Reminder window time out of range: {field} = {value}")]
    WindowOutOfRange { field: &'static str, value: u32 },

    /// Reminder interval must be positive while reminders are enabled
    #[error("Reminder interval must be greater than 0 minutes when enabled")]
    NonPositiveInterval,
}

/// Export/import document errors.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Document could not be parsed
    #[error("Failed to parse export document: {0}")]
    ParseFailed(String),

    /// Document carries an export version this build does not understand
    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
