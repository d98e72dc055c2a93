//! Storage-layer errors for the predictor tables.

use super::error_code::{self, PredictorErrorCode};

/// Errors surfaced by the predictor store.
///
/// Deleting or looking up an absent key is never an error: deletes are
/// no-ops and lookups return `Option`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The worker thread or its connection is gone.
    #[error("predictor storage is unavailable")]
    BackendUnavailable,

    /// The transaction for a call failed; none of its effects were applied.
    #[error("write failed: {message}")]
    WriteFailed { message: String },

    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    /// Stored schema version differs from the compiled-in one. Handled by a
    /// destructive reset inside the schema manager.
    #[error("schema version {found} is incompatible with {expected}")]
    SchemaIncompatible { found: u32, expected: u32 },

    #[error("database corruption detected: {details}")]
    CorruptionDetected { details: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl PredictorErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BackendUnavailable => error_code::STORAGE_UNAVAILABLE,
            Self::WriteFailed { .. } => error_code::WRITE_FAILED,
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::SchemaIncompatible { .. } => error_code::SCHEMA_INCOMPATIBLE,
            Self::CorruptionDetected { .. } => error_code::DB_CORRUPT,
            Self::Serialization { .. } => error_code::SERIALIZATION_ERROR,
            Self::InvalidInput { .. } => error_code::INVALID_INPUT,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
