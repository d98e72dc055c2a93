//! Schema versioning for the predictor tables.
//!
//! The version lives in `predictor_metadata` under the `version` key.
//! There is no migration path: any mismatch drops every predictor table and
//! recreates the schema at [`DATABASE_VERSION`].

pub mod tables;

use prefetch_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::sql_error;
use crate::connection::transaction::with_immediate_transaction;

/// Compiled-in schema version.
pub const DATABASE_VERSION: u32 = 1;

const VERSION_KEY: &str = "version";

/// What [`ensure_schema`] found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// No version was stored; a fresh schema was created.
    Created,
    /// The stored version matched; nothing changed.
    Current,
    /// The stored version was `found`; all data was discarded.
    Reset { found: u32 },
}

/// Bring the database to [`DATABASE_VERSION`], discarding data if needed.
pub fn ensure_schema(conn: &Connection) -> Result<SchemaStatus, StorageError> {
    let status = match get_database_version(conn)? {
        Some(v) if v == DATABASE_VERSION => {
            // Tables may be missing if someone dropped them by hand.
            conn.execute_batch(tables::CREATE_SQL).map_err(sql_error)?;
            return Ok(SchemaStatus::Current);
        }
        Some(found) => {
            let incompatible = StorageError::SchemaIncompatible {
                found,
                expected: DATABASE_VERSION,
            };
            tracing::warn!(error = %incompatible, "resetting predictor database");
            SchemaStatus::Reset { found }
        }
        None => SchemaStatus::Created,
    };

    reset(conn)?;

    tracing::info!(version = DATABASE_VERSION, ?status, "predictor schema initialized");
    Ok(status)
}

/// Drop and recreate all predictor tables at the current version.
pub fn reset(conn: &Connection) -> Result<(), StorageError> {
    with_immediate_transaction(conn, |tx| {
        tx.execute_batch(tables::DROP_SQL).map_err(sql_error)?;
        tx.execute_batch(tables::METADATA_SQL).map_err(sql_error)?;
        tx.execute_batch(tables::CREATE_SQL).map_err(sql_error)?;
        write_version(tx, DATABASE_VERSION)
    })
}

/// Stored schema version, or `None` on a database that was never stamped.
pub fn get_database_version(conn: &Connection) -> Result<Option<u32>, StorageError> {
    let has_metadata: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master
                           WHERE type = 'table' AND name = 'predictor_metadata')",
            [],
            |row| row.get(0),
        )
        .map_err(sql_error)?;
    if !has_metadata {
        return Ok(None);
    }

    let value: Option<i64> = conn
        .query_row(
            "SELECT value FROM predictor_metadata WHERE key = ?1",
            params![VERSION_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(sql_error)?;

    // Negative or oversized values cannot be ours; treat them as version 0.
    Ok(value.map(|v| u32::try_from(v).unwrap_or(0)))
}

/// Stamp `version` into the metadata table, creating it if needed.
pub fn set_database_version(conn: &Connection, version: u32) -> Result<(), StorageError> {
    conn.execute_batch(tables::METADATA_SQL).map_err(sql_error)?;
    write_version(conn, version)
}

fn write_version(conn: &Connection, version: u32) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO predictor_metadata (key, value) VALUES (?1, ?2)",
        params![VERSION_KEY, i64::from(version)],
    )
    .map_err(sql_error)?;
    Ok(())
}
