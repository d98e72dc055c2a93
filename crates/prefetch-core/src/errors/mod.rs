//! Error handling for the prefetch predictor.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::PredictorErrorCode;
pub use storage_error::{StorageError, StorageResult};
