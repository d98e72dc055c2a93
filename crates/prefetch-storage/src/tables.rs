//! In-memory mirror of the four predictor tables.
//!
//! Owned by the worker thread. It is loaded once at open and only mutated
//! after the matching transaction has committed, so readers never observe
//! a partially applied call.

use prefetch_core::errors::StorageError;
use prefetch_core::types::{PageAggregate, PrefetchDataMap, PrefetchKeyType, RedirectAggregate, RedirectDataMap};
use rusqlite::Connection;

use crate::persisted::PersistedAggregate;
use crate::queries::aggregate_rows;
use crate::queries::Table;

#[derive(Debug, Clone, Default)]
pub struct PredictorTables {
    pub url_data: PrefetchDataMap,
    pub host_data: PrefetchDataMap,
    pub url_redirect_data: RedirectDataMap,
    pub host_redirect_data: RedirectDataMap,
}

impl PredictorTables {
    /// Load every table. Undecodable rows are deleted from disk and skipped;
    /// returns the mirror and the number of rows dropped.
    pub fn load(conn: &Connection) -> Result<(Self, usize), StorageError> {
        let mut tables = Self::default();
        let mut dropped = 0;

        for key_type in [PrefetchKeyType::Url, PrefetchKeyType::Host] {
            dropped += load_into::<PageAggregate>(
                conn,
                Table::resources(key_type),
                tables.resources_mut(key_type),
            )?;
            dropped += load_into::<RedirectAggregate>(
                conn,
                Table::redirects(key_type),
                tables.redirects_mut(key_type),
            )?;
        }

        tracing::debug!(
            urls = tables.url_data.len(),
            hosts = tables.host_data.len(),
            url_redirects = tables.url_redirect_data.len(),
            host_redirects = tables.host_redirect_data.len(),
            dropped,
            "loaded predictor tables"
        );
        Ok((tables, dropped))
    }

    pub fn resources(&self, key_type: PrefetchKeyType) -> &PrefetchDataMap {
        match key_type {
            PrefetchKeyType::Url => &self.url_data,
            PrefetchKeyType::Host => &self.host_data,
        }
    }

    pub fn resources_mut(&mut self, key_type: PrefetchKeyType) -> &mut PrefetchDataMap {
        match key_type {
            PrefetchKeyType::Url => &mut self.url_data,
            PrefetchKeyType::Host => &mut self.host_data,
        }
    }

    pub fn redirects(&self, key_type: PrefetchKeyType) -> &RedirectDataMap {
        match key_type {
            PrefetchKeyType::Url => &self.url_redirect_data,
            PrefetchKeyType::Host => &self.host_redirect_data,
        }
    }

    pub fn redirects_mut(&mut self, key_type: PrefetchKeyType) -> &mut RedirectDataMap {
        match key_type {
            PrefetchKeyType::Url => &mut self.url_redirect_data,
            PrefetchKeyType::Host => &mut self.host_redirect_data,
        }
    }

    pub fn clear(&mut self) {
        self.url_data.clear();
        self.host_data.clear();
        self.url_redirect_data.clear();
        self.host_redirect_data.clear();
    }
}

fn load_into<A: PersistedAggregate>(
    conn: &Connection,
    table: Table,
    target: &mut std::collections::BTreeMap<String, A>,
) -> Result<usize, StorageError> {
    let loaded = aggregate_rows::load_all::<A>(conn, table)?;
    for key in &loaded.undecodable {
        aggregate_rows::delete(conn, table, key)?;
    }
    for aggregate in loaded.aggregates {
        target.insert(aggregate.primary_key().to_string(), aggregate);
    }
    Ok(loaded.undecodable.len())
}
