//! The worker loop and the per-command handlers.

use std::collections::BTreeMap;

use crossbeam_channel::Receiver;
use prefetch_core::config::LimitsConfig;
use prefetch_core::errors::{PredictorErrorCode, StorageError};
use prefetch_core::types::{PageAggregate, PrefetchKeyType, RedirectAggregate};
use rusqlite::Connection;

use super::commands::StoreCommand;
use crate::capacity;
use crate::connection::pragmas::optimize_on_close;
use crate::connection::transaction::with_immediate_transaction;
use crate::persisted::{prepare_for_write, PersistedAggregate};
use crate::queries::{aggregate_rows, Table};
use crate::tables::PredictorTables;

/// Counters reported by the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub commands: usize,
    /// Transactions committed. Calls that had nothing to write do not count.
    pub commits: usize,
    pub failed_writes: usize,
    pub rows_written: usize,
    pub rows_deleted: usize,
    pub evictions: usize,
}

/// Owns the connection and the mirror. Runs on its own thread.
pub struct StoreWorker {
    conn: Connection,
    tables: PredictorTables,
    limits: LimitsConfig,
    stats: WorkerStats,
}

/// Writes for one keyspace, planned against the mirror before committing.
struct KeyspaceWrite<A> {
    table: Table,
    key_type: PrefetchKeyType,
    upserts: Vec<A>,
    evictions: Vec<String>,
}

impl StoreWorker {
    pub fn new(conn: Connection, tables: PredictorTables, limits: LimitsConfig) -> Self {
        Self {
            conn,
            tables,
            limits,
            stats: WorkerStats::default(),
        }
    }

    /// Process commands until `Shutdown` or until every sender is gone.
    pub fn run(mut self, rx: Receiver<StoreCommand>) -> WorkerStats {
        for command in rx.iter() {
            if matches!(command, StoreCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }
        if let Err(e) = optimize_on_close(&self.conn) {
            tracing::debug!(error = %e, "optimize on close failed");
        }
        tracing::info!(stats = ?self.stats, "predictor store worker stopped");
        self.stats
    }

    fn handle(&mut self, command: StoreCommand) {
        self.stats.commands += 1;
        tracing::debug!(command = command.name(), "processing");
        match command {
            StoreCommand::GetAllData(reply) => {
                reply.send(Ok((self.tables.url_data.clone(), self.tables.host_data.clone())));
            }
            StoreCommand::GetData {
                key,
                key_type,
                reply,
            } => {
                reply.send(Ok(self.tables.resources(key_type).get(&key).cloned()));
            }
            StoreCommand::GetAllRedirectData(reply) => {
                reply.send(Ok((
                    self.tables.url_redirect_data.clone(),
                    self.tables.host_redirect_data.clone(),
                )));
            }
            StoreCommand::UpdateData { url, host, reply } => {
                let result = self.update_resources(url, host);
                reply.send(self.record(result));
            }
            StoreCommand::UpdateRedirectData { url, host, reply } => {
                let result = self.update_redirects(url, host);
                reply.send(self.record(result));
            }
            StoreCommand::DeleteData { urls, hosts, reply } => {
                let result = self.delete_resources(&urls, &hosts);
                reply.send(self.record(result));
            }
            StoreCommand::DeleteRedirectData { urls, hosts, reply } => {
                let result = self.delete_redirects(&urls, &hosts);
                reply.send(self.record(result));
            }
            StoreCommand::DeleteSingleDataPoint {
                key,
                key_type,
                reply,
            } => {
                let keys = [key];
                let result = match key_type {
                    PrefetchKeyType::Url => self.delete_resources(&keys, &[]),
                    PrefetchKeyType::Host => self.delete_resources(&[], &keys),
                };
                reply.send(self.record(result));
            }
            StoreCommand::DeleteSingleRedirectDataPoint {
                key,
                key_type,
                reply,
            } => {
                let keys = [key];
                let result = match key_type {
                    PrefetchKeyType::Url => self.delete_redirects(&keys, &[]),
                    PrefetchKeyType::Host => self.delete_redirects(&[], &keys),
                };
                reply.send(self.record(result));
            }
            StoreCommand::DeleteAllData(reply) => {
                let result = self.delete_all();
                reply.send(self.record(result));
            }
            StoreCommand::Stats(reply) => reply.send(Ok(self.stats)),
            StoreCommand::Flush(reply) => reply.send(Ok(())),
            StoreCommand::Shutdown => {}
        }
    }

    fn record(&mut self, result: Result<(), StorageError>) -> Result<(), StorageError> {
        if let Err(e) = &result {
            self.stats.failed_writes += 1;
            tracing::warn!(error = %e.coded_string(), "predictor write failed");
        }
        result
    }

    fn update_resources(&mut self, url: PageAggregate, host: PageAggregate) -> Result<(), StorageError> {
        let writes = [
            self.plan_write(url, PrefetchKeyType::Url, Table::resources, |t, k| t.resources(k))?,
            self.plan_write(host, PrefetchKeyType::Host, Table::resources, |t, k| t.resources(k))?,
        ];
        self.commit(&writes)?;
        for write in writes {
            self.apply(write, |t, k| t.resources_mut(k));
        }
        Ok(())
    }

    fn update_redirects(
        &mut self,
        url: RedirectAggregate,
        host: RedirectAggregate,
    ) -> Result<(), StorageError> {
        let writes = [
            self.plan_write(url, PrefetchKeyType::Url, Table::redirects, |t, k| t.redirects(k))?,
            self.plan_write(host, PrefetchKeyType::Host, Table::redirects, |t, k| t.redirects(k))?,
        ];
        self.commit(&writes)?;
        for write in writes {
            self.apply(write, |t, k| t.redirects_mut(k));
        }
        Ok(())
    }

    fn plan_write<A: PersistedAggregate>(
        &self,
        aggregate: A,
        key_type: PrefetchKeyType,
        table_for: fn(PrefetchKeyType) -> Table,
        map_for: impl Fn(&PredictorTables, PrefetchKeyType) -> &BTreeMap<String, A>,
    ) -> Result<KeyspaceWrite<A>, StorageError> {
        let upserts: Vec<A> = prepare_for_write(aggregate, key_type, &self.limits)?
            .into_iter()
            .collect();
        let capacity = match key_type {
            PrefetchKeyType::Url => self.limits.effective_max_urls_to_track(),
            PrefetchKeyType::Host => self.limits.effective_max_hosts_to_track(),
        };
        let evictions = if upserts.is_empty() {
            Vec::new()
        } else {
            capacity::plan_evictions(map_for(&self.tables, key_type), &upserts, capacity)
        };
        Ok(KeyspaceWrite {
            table: table_for(key_type),
            key_type,
            upserts,
            evictions,
        })
    }

    fn commit<A: PersistedAggregate>(&mut self, writes: &[KeyspaceWrite<A>]) -> Result<(), StorageError> {
        if writes.iter().all(|w| w.upserts.is_empty()) {
            return Ok(());
        }
        let (written, evicted) = with_immediate_transaction(&self.conn, |tx| {
            let mut written = 0;
            let mut evicted = 0;
            for write in writes {
                for aggregate in &write.upserts {
                    aggregate_rows::upsert(tx, write.table, aggregate)?;
                    written += 1;
                }
                for key in &write.evictions {
                    evicted += aggregate_rows::delete(tx, write.table, key)?;
                }
            }
            Ok((written, evicted))
        })?;
        self.stats.commits += 1;
        self.stats.rows_written += written;
        self.stats.evictions += evicted;
        Ok(())
    }

    fn apply<A: PersistedAggregate>(
        &mut self,
        write: KeyspaceWrite<A>,
        map_for: impl Fn(&mut PredictorTables, PrefetchKeyType) -> &mut BTreeMap<String, A>,
    ) {
        let map = map_for(&mut self.tables, write.key_type);
        for aggregate in write.upserts {
            map.insert(aggregate.primary_key().to_string(), aggregate);
        }
        for key in &write.evictions {
            if map.remove(key).is_some() {
                tracing::debug!(
                    kind = A::KIND,
                    key_type = write.key_type.as_str(),
                    key = %key,
                    "evicted least recently visited aggregate"
                );
            }
        }
    }

    fn delete_resources(&mut self, urls: &[String], hosts: &[String]) -> Result<(), StorageError> {
        let deleted = self.delete_rows(Table::UrlResources, urls, Table::HostResources, hosts)?;
        for key in urls {
            self.tables.url_data.remove(key);
        }
        for key in hosts {
            self.tables.host_data.remove(key);
        }
        self.stats.rows_deleted += deleted;
        Ok(())
    }

    fn delete_redirects(&mut self, urls: &[String], hosts: &[String]) -> Result<(), StorageError> {
        let deleted = self.delete_rows(Table::UrlRedirects, urls, Table::HostRedirects, hosts)?;
        for key in urls {
            self.tables.url_redirect_data.remove(key);
        }
        for key in hosts {
            self.tables.host_redirect_data.remove(key);
        }
        self.stats.rows_deleted += deleted;
        Ok(())
    }

    fn delete_rows(
        &mut self,
        url_table: Table,
        urls: &[String],
        host_table: Table,
        hosts: &[String],
    ) -> Result<usize, StorageError> {
        if urls.is_empty() && hosts.is_empty() {
            return Ok(0);
        }
        let deleted = with_immediate_transaction(&self.conn, |tx| {
            let mut deleted = 0;
            for key in urls {
                deleted += aggregate_rows::delete(tx, url_table, key)?;
            }
            for key in hosts {
                deleted += aggregate_rows::delete(tx, host_table, key)?;
            }
            Ok(deleted)
        })?;
        self.stats.commits += 1;
        Ok(deleted)
    }

    fn delete_all(&mut self) -> Result<(), StorageError> {
        let deleted = with_immediate_transaction(&self.conn, |tx| {
            let mut deleted = 0;
            for table in Table::ALL {
                deleted += aggregate_rows::clear(tx, table)?;
            }
            Ok(deleted)
        })?;
        self.tables.clear();
        self.stats.commits += 1;
        self.stats.rows_deleted += deleted;
        tracing::info!(deleted, "cleared predictor tables");
        Ok(())
    }
}
