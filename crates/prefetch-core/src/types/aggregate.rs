//! Per-page aggregates ("prefetch data").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::resource::ResourceRecord;

/// Which keyspace an aggregate lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefetchKeyType {
    Url,
    Host,
}

impl PrefetchKeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Host => "host",
        }
    }
}

/// All resource statistics for one page-key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAggregate {
    pub key_type: PrefetchKeyType,
    pub primary_key: String,
    /// Microseconds since the Unix epoch.
    pub last_visit: i64,
    pub resources: Vec<ResourceRecord>,
}

/// Aggregates of one keyspace, keyed by primary key.
pub type PrefetchDataMap = BTreeMap<String, PageAggregate>;

impl PageAggregate {
    pub fn new(key_type: PrefetchKeyType, primary_key: impl Into<String>) -> Self {
        Self {
            key_type,
            primary_key: primary_key.into(),
            last_visit: 0,
            resources: Vec::new(),
        }
    }

    /// The "no update for this keyspace" sentinel.
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
