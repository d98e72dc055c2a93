//! Top-level predictor configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{LimitsConfig, StorageConfig};
use crate::errors::ConfigError;

/// Environment variables read by [`PredictorConfig::load`].
pub const ENV_VARS: &[&str] = &[
    "PREFETCH_MAX_URLS_TO_TRACK",
    "PREFETCH_MAX_HOSTS_TO_TRACK",
    "PREFETCH_MAX_RESOURCES_PER_ENTRY",
    "PREFETCH_MAX_CONSECUTIVE_MISSES",
    "PREFETCH_MAX_STRING_LENGTH",
    "PREFETCH_BUSY_TIMEOUT_MS",
];

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`PREFETCH_*`)
/// 2. Project config (`prefetch.toml` in the profile root)
/// 3. User config (`~/.prefetch/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PredictorConfig {
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

impl PredictorConfig {
    /// Load configuration for the profile rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join("prefetch.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Every limit must be strictly positive.
    pub fn validate(config: &PredictorConfig) -> Result<(), ConfigError> {
        let limits = &config.limits;
        let checks: [(&str, Option<usize>); 5] = [
            ("limits.max_urls_to_track", limits.max_urls_to_track),
            ("limits.max_hosts_to_track", limits.max_hosts_to_track),
            ("limits.max_resources_per_entry", limits.max_resources_per_entry),
            (
                "limits.max_consecutive_misses",
                limits.max_consecutive_misses.map(|v| v as usize),
            ),
            ("limits.max_string_length", limits.max_string_length),
        ];
        for (field, value) in checks {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ref file) = config.storage.database_file {
            if file.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.database_file".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Full path of the database file under `profile_dir`.
    pub fn database_path(&self, profile_dir: &Path) -> PathBuf {
        profile_dir.join(self.storage.effective_database_file())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".prefetch").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut PredictorConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: PredictorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// `other` overrides `base` only where `other` has a value.
    fn merge(base: &mut PredictorConfig, other: &PredictorConfig) {
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
        if other.storage.database_file.is_some() {
            base.storage.database_file = other.storage.database_file.clone();
        }

        if other.limits.max_urls_to_track.is_some() {
            base.limits.max_urls_to_track = other.limits.max_urls_to_track;
        }
        if other.limits.max_hosts_to_track.is_some() {
            base.limits.max_hosts_to_track = other.limits.max_hosts_to_track;
        }
        if other.limits.max_resources_per_entry.is_some() {
            base.limits.max_resources_per_entry = other.limits.max_resources_per_entry;
        }
        if other.limits.max_consecutive_misses.is_some() {
            base.limits.max_consecutive_misses = other.limits.max_consecutive_misses;
        }
        if other.limits.max_string_length.is_some() {
            base.limits.max_string_length = other.limits.max_string_length;
        }
    }

    /// Pattern: `PREFETCH_MAX_URLS_TO_TRACK`, `PREFETCH_BUSY_TIMEOUT_MS`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut PredictorConfig) {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parsed("PREFETCH_MAX_URLS_TO_TRACK") {
            config.limits.max_urls_to_track = Some(v);
        }
        if let Some(v) = parsed("PREFETCH_MAX_HOSTS_TO_TRACK") {
            config.limits.max_hosts_to_track = Some(v);
        }
        if let Some(v) = parsed("PREFETCH_MAX_RESOURCES_PER_ENTRY") {
            config.limits.max_resources_per_entry = Some(v);
        }
        if let Some(v) = parsed("PREFETCH_MAX_CONSECUTIVE_MISSES") {
            config.limits.max_consecutive_misses = Some(v);
        }
        if let Some(v) = parsed("PREFETCH_MAX_STRING_LENGTH") {
            config.limits.max_string_length = Some(v);
        }
        if let Some(v) = parsed("PREFETCH_BUSY_TIMEOUT_MS") {
            config.storage.busy_timeout_ms = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
