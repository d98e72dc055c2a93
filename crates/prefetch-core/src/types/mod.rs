//! Data model for the predictor tables.

pub mod aggregate;
pub mod redirect;
pub mod resource;

pub use aggregate::{PageAggregate, PrefetchDataMap, PrefetchKeyType};
pub use redirect::{RedirectAggregate, RedirectDataMap, RedirectStat};
pub use resource::{RequestPriority, ResourceCategory, ResourceRecord};

/// Current time as microseconds since the Unix epoch.
pub fn now_micros() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or_default()
}
