//! SQLite backend configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;
pub const DEFAULT_DATABASE_FILE: &str = "predictor.db";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u32>,
    /// Database file name, relative to the profile directory.
    pub database_file: Option<String>,
}

impl StorageConfig {
    pub fn effective_busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn effective_database_file(&self) -> &str {
        self.database_file.as_deref().unwrap_or(DEFAULT_DATABASE_FILE)
    }
}
