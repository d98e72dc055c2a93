//! Configuration system for the predictor.
//! TOML-based, layered resolution: env > project > user > defaults.

pub mod limits_config;
pub mod predictor_config;
pub mod storage_config;

pub use limits_config::LimitsConfig;
pub use predictor_config::PredictorConfig;
pub use storage_config::StorageConfig;
