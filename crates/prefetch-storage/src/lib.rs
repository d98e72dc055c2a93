//! SQLite persistence for the resource prefetch predictor.
//!
//! Two resource keyspaces (URL, host) and two redirect keyspaces, each a
//! table of `primary_key → (last_visit, JSON payload)`, served from an
//! in-memory mirror by a single worker thread.

pub mod capacity;
pub mod connection;
pub mod persisted;
pub mod queries;
pub mod recovery;
pub mod schema;
pub mod store;
pub mod tables;
pub mod worker;

pub use schema::{SchemaStatus, DATABASE_VERSION};
pub use store::{OpenReport, PredictorStore, StoreHandle};
pub use worker::{Completion, WorkerStats};
