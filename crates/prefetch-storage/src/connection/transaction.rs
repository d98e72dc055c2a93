//! Write transactions: BEGIN IMMEDIATE, all-or-nothing.

use prefetch_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Run `f` inside a BEGIN IMMEDIATE transaction.
///
/// Any failure inside `f` or at commit rolls the whole transaction back
/// and is reported as [`StorageError::WriteFailed`]; serialization and
/// input errors keep their own kind.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        StorageError::WriteFailed {
            message: format!("failed to begin immediate transaction: {e}"),
        }
    })?;

    // Dropping `tx` on the error path rolls back.
    let result = f(&tx).map_err(into_write_failed)?;

    tx.commit().map_err(|e| StorageError::WriteFailed {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

fn into_write_failed(e: StorageError) -> StorageError {
    match e {
        StorageError::SqliteError { message } => StorageError::WriteFailed { message },
        other => other,
    }
}
