//! Aggregate rows: upsert, delete, clear, load.

use prefetch_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::Table;
use crate::connection::sql_error;
use crate::persisted::PersistedAggregate;

/// Rows read back from a table.
#[derive(Debug)]
pub struct LoadedRows<A> {
    pub aggregates: Vec<A>,
    /// Keys whose payload could not be decoded.
    pub undecodable: Vec<String>,
}

/// Insert or wholesale-replace the row for `aggregate`.
pub fn upsert<A: PersistedAggregate>(
    conn: &Connection,
    table: Table,
    aggregate: &A,
) -> Result<(), StorageError> {
    let payload = serde_json::to_string(aggregate.entries())?;
    let sql = format!(
        "INSERT OR REPLACE INTO {} (primary_key, last_visit, {}) VALUES (?1, ?2, ?3)",
        table.name(),
        A::PAYLOAD_COLUMN
    );
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| {
            stmt.execute(params![
                aggregate.primary_key(),
                aggregate.last_visit(),
                payload
            ])
        })
        .map_err(sql_error)?;
    Ok(())
}

/// Delete one row. Returns the number of rows removed (0 or 1).
pub fn delete(conn: &Connection, table: Table, primary_key: &str) -> Result<usize, StorageError> {
    let sql = format!("DELETE FROM {} WHERE primary_key = ?1", table.name());
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| stmt.execute(params![primary_key]))
        .map_err(sql_error)
}

/// Delete every row of `table`.
pub fn clear(conn: &Connection, table: Table) -> Result<usize, StorageError> {
    conn.execute(&format!("DELETE FROM {}", table.name()), [])
        .map_err(sql_error)
}

/// Read every row of `table`.
pub fn load_all<A: PersistedAggregate>(
    conn: &Connection,
    table: Table,
) -> Result<LoadedRows<A>, StorageError> {
    let sql = format!(
        "SELECT primary_key, last_visit, {} FROM {}",
        A::PAYLOAD_COLUMN,
        table.name()
    );
    let mut stmt = conn.prepare(&sql).map_err(sql_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(sql_error)?;

    let mut loaded = LoadedRows {
        aggregates: Vec::new(),
        undecodable: Vec::new(),
    };
    for row in rows {
        let (primary_key, last_visit, payload) = row.map_err(sql_error)?;
        match serde_json::from_str::<Vec<A::Entry>>(&payload) {
            Ok(entries) => loaded.aggregates.push(A::from_parts(
                table.key_type(),
                primary_key,
                last_visit,
                entries,
            )),
            Err(e) => {
                tracing::warn!(
                    table = table.name(),
                    key = %primary_key,
                    error = %e,
                    "undecodable predictor row"
                );
                loaded.undecodable.push(primary_key);
            }
        }
    }
    Ok(loaded)
}
