//! Stable error codes for collaborators that degrade on failure.

/// Every error enum implements this to expose a structured code string,
/// so a prefetch-decision collaborator can log or branch on the failure
/// kind without matching on display text.
pub trait PredictorErrorCode {
    /// Returns the error code string (e.g., "WRITE_FAILED").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
pub const WRITE_FAILED: &str = "WRITE_FAILED";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const SCHEMA_INCOMPATIBLE: &str = "SCHEMA_INCOMPATIBLE";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
