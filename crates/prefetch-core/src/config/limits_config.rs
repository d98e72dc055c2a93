//! Size limits for the predictor tables.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_URLS_TO_TRACK: usize = 500;
pub const DEFAULT_MAX_HOSTS_TO_TRACK: usize = 200;
pub const DEFAULT_MAX_RESOURCES_PER_ENTRY: usize = 50;
pub const DEFAULT_MAX_CONSECUTIVE_MISSES: u32 = 3;
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1024;

/// Bounds applied when aggregates are learned and stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum URL-keyed aggregates per keyspace. Default: 500.
    pub max_urls_to_track: Option<usize>,
    /// Maximum host-keyed aggregates per keyspace. Default: 200.
    pub max_hosts_to_track: Option<usize>,
    /// Maximum resource records kept per aggregate. Default: 50.
    pub max_resources_per_entry: Option<usize>,
    /// Consecutive misses after which a record is dropped by learning. Default: 3.
    pub max_consecutive_misses: Option<u32>,
    /// Longest primary key or resource URL accepted. Default: 1024.
    pub max_string_length: Option<usize>,
}

impl LimitsConfig {
    pub fn effective_max_urls_to_track(&self) -> usize {
        self.max_urls_to_track.unwrap_or(DEFAULT_MAX_URLS_TO_TRACK)
    }

    pub fn effective_max_hosts_to_track(&self) -> usize {
        self.max_hosts_to_track.unwrap_or(DEFAULT_MAX_HOSTS_TO_TRACK)
    }

    pub fn effective_max_resources_per_entry(&self) -> usize {
        self.max_resources_per_entry
            .unwrap_or(DEFAULT_MAX_RESOURCES_PER_ENTRY)
    }

    pub fn effective_max_consecutive_misses(&self) -> u32 {
        self.max_consecutive_misses
            .unwrap_or(DEFAULT_MAX_CONSECUTIVE_MISSES)
    }

    pub fn effective_max_string_length(&self) -> usize {
        self.max_string_length.unwrap_or(DEFAULT_MAX_STRING_LENGTH)
    }
}
