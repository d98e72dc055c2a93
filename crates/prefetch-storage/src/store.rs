//! The public face of the predictor tables.
//!
//! Construction opens the database, checks integrity, brings the schema to
//! the current version and loads the mirror, then hands the connection to a
//! dedicated worker thread. Every operation afterwards is queued to that
//! worker and returns a [`Completion`].

use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};
use prefetch_core::config::PredictorConfig;
use prefetch_core::errors::StorageError;
use prefetch_core::types::{PageAggregate, PrefetchKeyType, RedirectAggregate};
use rusqlite::Connection;

use crate::connection;
use crate::recovery;
use crate::schema::{self, SchemaStatus};
use crate::tables::PredictorTables;
use crate::worker::commands::{DataMaps, RedirectMaps};
use crate::worker::completion::Responder;
use crate::worker::{Completion, StoreCommand, StoreWorker, WorkerStats};

/// What happened while opening the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenReport {
    pub schema: SchemaStatus,
    /// The file was not a readable database and was recreated.
    pub replaced_corrupt_file: bool,
    /// `quick_check` failed and all tables were discarded.
    pub integrity_reset: bool,
    /// Rows dropped because their payload could not be decoded.
    pub dropped_rows: usize,
}

/// Cheap, cloneable submission handle for collaborators.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: Sender<StoreCommand>,
}

/// Owns the worker thread. Dropping it drains the queue and joins.
pub struct PredictorStore {
    handle: StoreHandle,
    worker: Option<JoinHandle<WorkerStats>>,
    report: OpenReport,
}

impl PredictorStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path, config: &PredictorConfig) -> Result<Self, StorageError> {
        let opened = connection::open_file(path, &config.storage)?;
        tracing::info!(path = %path.display(), "opening predictor store");
        Self::start(opened.conn, opened.replaced_corrupt_file, config)
    }

    /// Open a store backed by an in-memory database (for testing).
    pub fn open_in_memory(config: &PredictorConfig) -> Result<Self, StorageError> {
        let conn = connection::open_in_memory(&config.storage)?;
        Self::start(conn, false, config)
    }

    fn start(
        conn: Connection,
        replaced_corrupt_file: bool,
        config: &PredictorConfig,
    ) -> Result<Self, StorageError> {
        let integrity_reset = recovery::reset_if_corrupt(&conn)?;
        let schema = schema::ensure_schema(&conn)?;
        let (tables, dropped_rows) = PredictorTables::load(&conn)?;

        let report = OpenReport {
            schema,
            replaced_corrupt_file,
            integrity_reset,
            dropped_rows,
        };

        let (tx, rx) = unbounded();
        let worker = StoreWorker::new(conn, tables, config.limits.clone());
        let join = std::thread::Builder::new()
            .name("prefetch-store".to_string())
            .spawn(move || worker.run(rx))
            .map_err(|e| StorageError::SqliteError {
                message: format!("failed to spawn store worker: {e}"),
            })?;

        tracing::info!(?report, "predictor store ready");
        Ok(Self {
            handle: StoreHandle { tx },
            worker: Some(join),
            report,
        })
    }

    pub fn open_report(&self) -> OpenReport {
        self.report
    }

    pub fn schema_status(&self) -> SchemaStatus {
        self.report.schema
    }

    /// A handle collaborators can hold independently of the store.
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Drain queued commands, stop the worker and return its counters.
    pub fn shutdown(mut self) -> Result<WorkerStats, StorageError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<WorkerStats, StorageError> {
        let Some(join) = self.worker.take() else {
            return Err(StorageError::BackendUnavailable);
        };
        // The worker may already be gone if every handle was dropped.
        let _ = self.handle.tx.send(StoreCommand::Shutdown);
        join.join().map_err(|_| StorageError::BackendUnavailable)
    }
}

impl Drop for PredictorStore {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                tracing::warn!(error = %e, "predictor store worker did not stop cleanly");
            }
        }
    }
}

impl std::ops::Deref for PredictorStore {
    type Target = StoreHandle;

    fn deref(&self) -> &StoreHandle {
        &self.handle
    }
}

impl StoreHandle {
    fn submit<T>(&self, make: impl FnOnce(Responder<T>) -> StoreCommand) -> Completion<T> {
        let (responder, completion) = Completion::channel();
        match self.tx.send(make(responder)) {
            Ok(()) => completion,
            Err(_) => Completion::failed(StorageError::BackendUnavailable),
        }
    }

    /// Snapshot of the URL and host resource maps.
    pub fn get_all_data(&self) -> Completion<DataMaps> {
        self.submit(StoreCommand::GetAllData)
    }

    /// One aggregate, if present.
    pub fn get_data(&self, key: &str, key_type: PrefetchKeyType) -> Completion<Option<PageAggregate>> {
        self.submit(|reply| StoreCommand::GetData {
            key: key.to_string(),
            key_type,
            reply,
        })
    }

    /// Snapshot of the URL and host redirect maps.
    pub fn get_all_redirect_data(&self) -> Completion<RedirectMaps> {
        self.submit(StoreCommand::GetAllRedirectData)
    }

    /// Replace the aggregates for `url` and `host` in one transaction.
    /// Pass [`PageAggregate::empty`] to leave a keyspace untouched.
    pub fn update_data(&self, url: PageAggregate, host: PageAggregate) -> Completion<()> {
        self.submit(|reply| StoreCommand::UpdateData { url, host, reply })
    }

    pub fn update_redirect_data(
        &self,
        url: RedirectAggregate,
        host: RedirectAggregate,
    ) -> Completion<()> {
        self.submit(|reply| StoreCommand::UpdateRedirectData { url, host, reply })
    }

    /// Remove resource aggregates by key. Absent keys are ignored.
    pub fn delete_data(&self, urls: &[String], hosts: &[String]) -> Completion<()> {
        self.submit(|reply| StoreCommand::DeleteData {
            urls: urls.to_vec(),
            hosts: hosts.to_vec(),
            reply,
        })
    }

    pub fn delete_redirect_data(&self, urls: &[String], hosts: &[String]) -> Completion<()> {
        self.submit(|reply| StoreCommand::DeleteRedirectData {
            urls: urls.to_vec(),
            hosts: hosts.to_vec(),
            reply,
        })
    }

    pub fn delete_single_data_point(&self, key: &str, key_type: PrefetchKeyType) -> Completion<()> {
        self.submit(|reply| StoreCommand::DeleteSingleDataPoint {
            key: key.to_string(),
            key_type,
            reply,
        })
    }

    pub fn delete_single_redirect_data_point(
        &self,
        key: &str,
        key_type: PrefetchKeyType,
    ) -> Completion<()> {
        self.submit(|reply| StoreCommand::DeleteSingleRedirectDataPoint {
            key: key.to_string(),
            key_type,
            reply,
        })
    }

    /// Clear every keyspace, resources and redirects alike.
    pub fn delete_all_data(&self) -> Completion<()> {
        self.submit(StoreCommand::DeleteAllData)
    }

    pub fn stats(&self) -> Completion<WorkerStats> {
        self.submit(StoreCommand::Stats)
    }

    /// Completes after everything submitted before it.
    pub fn flush(&self) -> Completion<()> {
        self.submit(StoreCommand::Flush)
    }
}
