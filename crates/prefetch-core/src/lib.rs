//! Core of the resource prefetch predictor: the page/resource data model,
//! scoring, visit learning, errors, configuration and tracing setup.

pub mod config;
pub mod errors;
pub mod learning;
pub mod scoring;
pub mod tracing;
pub mod types;

pub use config::PredictorConfig;
pub use errors::{StorageError, StorageResult};
pub use types::{
    PageAggregate, PrefetchDataMap, PrefetchKeyType, RedirectAggregate, RedirectDataMap,
    RedirectStat, RequestPriority, ResourceCategory, ResourceRecord,
};
