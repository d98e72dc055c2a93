//! Folding a single visit into historical statistics.
//!
//! The store replaces aggregates wholesale, so callers that want
//! incremental statistics build the next aggregate here and hand it to
//! `update_data`.

use std::collections::HashMap;

use crate::config::LimitsConfig;
use crate::scoring;
use crate::types::{
    PageAggregate, PrefetchKeyType, RedirectAggregate, RedirectStat, RequestPriority,
    ResourceCategory, ResourceRecord,
};

/// One sub-resource seen during a page load.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedResource {
    pub resource_url: String,
    pub resource_category: ResourceCategory,
    pub priority: RequestPriority,
    pub has_validators: bool,
    pub always_revalidate: bool,
}

impl ObservedResource {
    pub fn new(resource_url: impl Into<String>, resource_category: ResourceCategory) -> Self {
        Self {
            resource_url: resource_url.into(),
            resource_category,
            priority: RequestPriority::default(),
            has_validators: false,
            always_revalidate: false,
        }
    }
}

/// Merge the resources loaded by one visit (in load order) into `existing`.
///
/// Known resources that were loaded again count a hit and have their
/// average position updated; known resources that were not loaded count a
/// miss. Records reaching `max_consecutive_misses` are dropped, and the
/// result is ranked and trimmed to `max_resources_per_entry`.
pub fn merge_visit(
    existing: Option<&PageAggregate>,
    key_type: PrefetchKeyType,
    primary_key: &str,
    observed: &[ObservedResource],
    now: i64,
    limits: &LimitsConfig,
) -> PageAggregate {
    // Positions count distinct resources from 1; repeats keep their first slot.
    let mut positions: HashMap<&str, (usize, &ObservedResource)> = HashMap::new();
    for resource in observed {
        let next = positions.len() + 1;
        positions
            .entry(resource.resource_url.as_str())
            .or_insert((next, resource));
    }

    let mut merged = PageAggregate::new(key_type, primary_key).with_last_visit(now);
    for old in existing.map(|e| e.resources.as_slice()).unwrap_or_default() {
        let mut record = old.clone();
        match positions.remove(old.resource_url.as_str()) {
            Some((position, seen)) => {
                // Misses have no position; average over hits only.
                let hits = f64::from(record.hit_count);
                record.average_position =
                    (record.average_position * hits + position as f64) / (hits + 1.0);
                record.hit_count = record.hit_count.saturating_add(1);
                record.consecutive_miss_count = 0;
                record.resource_category = seen.resource_category;
                record.priority = seen.priority;
                record.has_validators = seen.has_validators;
                record.always_revalidate = seen.always_revalidate;
            }
            None => {
                record.miss_count = record.miss_count.saturating_add(1);
                record.consecutive_miss_count = record.consecutive_miss_count.saturating_add(1);
            }
        }
        merged.resources.push(record);
    }

    let mut fresh: Vec<_> = positions.into_values().collect();
    fresh.sort_by_key(|(position, _)| *position);
    for (position, seen) in fresh {
        merged.resources.push(ResourceRecord::new(
            seen.resource_url.clone(),
            seen.resource_category,
            1,
            0,
            0,
            position as f64,
            seen.priority,
            seen.has_validators,
            seen.always_revalidate,
        ));
    }

    let max_misses = limits.effective_max_consecutive_misses();
    merged
        .resources
        .retain(|r| r.consecutive_miss_count < max_misses);
    scoring::trim_resources(&mut merged.resources, limits.effective_max_resources_per_entry());

    tracing::trace!(
        key = primary_key,
        key_type = key_type.as_str(),
        resources = merged.resources.len(),
        "merged visit"
    );
    merged
}

/// Merge the final endpoint of one navigation into `existing`.
pub fn merge_redirect(
    existing: Option<&RedirectAggregate>,
    key_type: PrefetchKeyType,
    primary_key: &str,
    final_url: &str,
    now: i64,
    limits: &LimitsConfig,
) -> RedirectAggregate {
    let mut merged = RedirectAggregate::new(key_type, primary_key).with_last_visit(now);
    let mut seen = false;
    for old in existing.map(|e| e.endpoints.as_slice()).unwrap_or_default() {
        let mut stat = old.clone();
        if stat.url == final_url {
            stat.hit_count = stat.hit_count.saturating_add(1);
            stat.consecutive_miss_count = 0;
            seen = true;
        } else {
            stat.miss_count = stat.miss_count.saturating_add(1);
            stat.consecutive_miss_count = stat.consecutive_miss_count.saturating_add(1);
        }
        merged.endpoints.push(stat);
    }
    if !seen {
        merged.endpoints.push(RedirectStat::new(final_url, 1, 0, 0));
    }

    let max_misses = limits.effective_max_consecutive_misses();
    merged
        .endpoints
        .retain(|e| e.consecutive_miss_count < max_misses);
    merged
}
