//! Redirect endpoints observed for a page-key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aggregate::PrefetchKeyType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectStat {
    pub url: String,
    pub hit_count: u32,
    pub miss_count: u32,
    pub consecutive_miss_count: u32,
}

impl RedirectStat {
    pub fn new(
        url: impl Into<String>,
        hit_count: u32,
        miss_count: u32,
        consecutive_miss_count: u32,
    ) -> Self {
        Self {
            url: url.into(),
            hit_count,
            miss_count,
            consecutive_miss_count,
        }
    }

    pub fn has_observations(&self) -> bool {
        self.hit_count > 0 || self.miss_count > 0
    }
}

/// Where navigations to one page-key ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectAggregate {
    pub key_type: PrefetchKeyType,
    pub primary_key: String,
    /// Microseconds since the Unix epoch.
    pub last_visit: i64,
    pub endpoints: Vec<RedirectStat>,
}

pub type RedirectDataMap = BTreeMap<String, RedirectAggregate>;

impl RedirectAggregate {
    pub fn new(key_type: PrefetchKeyType, primary_key: impl Into<String>) -> Self {
        Self {
            key_type,
            primary_key: primary_key.into(),
            last_visit: 0,
            endpoints: Vec::new(),
        }
    }

    pub fn empty(key_type: PrefetchKeyType) -> Self {
        Self::new(key_type, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.primary_key.is_empty()
    }

    pub fn with_last_visit(mut self, last_visit: i64) -> Self {
        self.last_visit = last_visit;
        self
    }
}
