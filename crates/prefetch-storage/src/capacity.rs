//! Bounded growth of the keyspaces.
//!
//! After an insert, a keyspace holding more than its cap loses the
//! aggregates with the oldest `last_visit` until it is back at the cap.
//! Ties are broken by primary key so eviction is deterministic.

use std::collections::BTreeMap;

use crate::persisted::PersistedAggregate;

/// Keys to evict from `existing` once `incoming` are inserted into it.
///
/// `incoming` replace existing entries with the same key. An incoming
/// aggregate can itself be evicted when it is the oldest.
pub fn plan_evictions<A: PersistedAggregate>(
    existing: &BTreeMap<String, A>,
    incoming: &[A],
    capacity: usize,
) -> Vec<String> {
    let added = incoming
        .iter()
        .filter(|a| !existing.contains_key(a.primary_key()))
        .count();
    let total = existing.len() + added;
    if total <= capacity {
        return Vec::new();
    }

    let mut candidates: Vec<(i64, &str)> = existing
        .iter()
        .filter(|(key, _)| !incoming.iter().any(|a| a.primary_key() == key.as_str()))
        .map(|(key, a)| (a.last_visit(), key.as_str()))
        .chain(incoming.iter().map(|a| (a.last_visit(), a.primary_key())))
        .collect();
    candidates.sort_unstable();

    let evict = total - capacity;
    candidates
        .into_iter()
        .take(evict)
        .map(|(_, key)| key.to_string())
        .collect()
}
