//! What the store needs to know about an aggregate to persist it.
//!
//! Resource and redirect aggregates share one row layout
//! (`primary_key`, `last_visit`, JSON payload), so the queries, the mirror
//! and capacity enforcement are written once against this trait.

use std::collections::HashSet;

use prefetch_core::config::LimitsConfig;
use prefetch_core::errors::StorageError;
use prefetch_core::scoring;
use prefetch_core::types::{PageAggregate, PrefetchKeyType, RedirectAggregate, RedirectStat, ResourceRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait PersistedAggregate: Clone + Send + 'static {
    type Entry: Serialize + DeserializeOwned + Clone;

    /// Name of the JSON payload column.
    const PAYLOAD_COLUMN: &'static str;
    /// Label used in logs.
    const KIND: &'static str;

    /// The empty-key "no update for this keyspace" value.
    fn is_sentinel(&self) -> bool;
    fn key_type(&self) -> PrefetchKeyType;
    fn primary_key(&self) -> &str;
    fn last_visit(&self) -> i64;
    fn entries(&self) -> &[Self::Entry];
    fn from_parts(
        key_type: PrefetchKeyType,
        primary_key: String,
        last_visit: i64,
        entries: Vec<Self::Entry>,
    ) -> Self;

    /// Drop invalid entries and put the rest in stored order.
    fn normalize_entries(&mut self, limits: &LimitsConfig);
}

impl PersistedAggregate for PageAggregate {
    type Entry = ResourceRecord;

    const PAYLOAD_COLUMN: &'static str = "resources";
    const KIND: &'static str = "resource";

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }

    fn key_type(&self) -> PrefetchKeyType {
        self.key_type
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn last_visit(&self) -> i64 {
        self.last_visit
    }

    fn entries(&self) -> &[ResourceRecord] {
        &self.resources
    }

    fn from_parts(
        key_type: PrefetchKeyType,
        primary_key: String,
        last_visit: i64,
        entries: Vec<ResourceRecord>,
    ) -> Self {
        Self {
            key_type,
            primary_key,
            last_visit,
            resources: entries,
        }
    }

    fn normalize_entries(&mut self, limits: &LimitsConfig) {
        let max_len = limits.effective_max_string_length();
        let mut seen = HashSet::new();
        let before = self.resources.len();
        self.resources.retain(|r| {
            r.has_observations()
                && r.average_position.is_finite()
                && r.resource_url.len() <= max_len
                && seen.insert(r.resource_url.clone())
        });
        if self.resources.len() != before {
            tracing::debug!(
                key = %self.primary_key,
                dropped = before - self.resources.len(),
                "dropped unstorable resource records"
            );
        }
        scoring::trim_resources(&mut self.resources, limits.effective_max_resources_per_entry());
    }
}

impl PersistedAggregate for RedirectAggregate {
    type Entry = RedirectStat;

    const PAYLOAD_COLUMN: &'static str = "endpoints";
    const KIND: &'static str = "redirect";

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }

    fn key_type(&self) -> PrefetchKeyType {
        self.key_type
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn last_visit(&self) -> i64 {
        self.last_visit
    }

    fn entries(&self) -> &[RedirectStat] {
        &self.endpoints
    }

    fn from_parts(
        key_type: PrefetchKeyType,
        primary_key: String,
        last_visit: i64,
        entries: Vec<RedirectStat>,
    ) -> Self {
        Self {
            key_type,
            primary_key,
            last_visit,
            endpoints: entries,
        }
    }

    fn normalize_entries(&mut self, limits: &LimitsConfig) {
        let max_len = limits.effective_max_string_length();
        let mut seen = HashSet::new();
        self.endpoints.retain(|e| {
            e.has_observations() && e.url.len() <= max_len && seen.insert(e.url.clone())
        });
        self.endpoints.sort_by(|a, b| b.hit_count.cmp(&a.hit_count));
    }
}

/// Validate an aggregate bound for the `slot` keyspace.
///
/// Returns `Ok(None)` for the empty sentinel and for over-long keys, which
/// are skipped rather than failing the whole call.
pub fn prepare_for_write<A: PersistedAggregate>(
    mut aggregate: A,
    slot: PrefetchKeyType,
    limits: &LimitsConfig,
) -> Result<Option<A>, StorageError> {
    if aggregate.is_sentinel() {
        return Ok(None);
    }
    if aggregate.key_type() != slot {
        return Err(StorageError::InvalidInput {
            message: format!(
                "{} aggregate '{}' has key type {} but was passed as {}",
                A::KIND,
                aggregate.primary_key(),
                aggregate.key_type().as_str(),
                slot.as_str()
            ),
        });
    }
    if aggregate.primary_key().len() > limits.effective_max_string_length() {
        tracing::warn!(
            kind = A::KIND,
            key_type = slot.as_str(),
            len = aggregate.primary_key().len(),
            "primary key too long, skipping update"
        );
        return Ok(None);
    }
    aggregate.normalize_entries(limits);
    Ok(Some(aggregate))
}
