//! Integrity checks run before the store serves anything.

use prefetch_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sql_error;

/// Run `PRAGMA quick_check`. Returns `Ok(None)` when healthy, otherwise the
/// problems SQLite reported.
pub fn quick_check(conn: &Connection) -> Result<Option<String>, StorageError> {
    let mut stmt = conn.prepare("PRAGMA quick_check").map_err(sql_error)?;
    let findings = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sql_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql_error)?;

    if findings.len() == 1 && findings[0].eq_ignore_ascii_case("ok") {
        Ok(None)
    } else {
        Ok(Some(findings.join("; ")))
    }
}

/// Check integrity and, if it fails, discard every predictor table.
/// Returns true when a reset happened.
pub fn reset_if_corrupt(conn: &Connection) -> Result<bool, StorageError> {
    let details = match quick_check(conn) {
        Ok(None) => return Ok(false),
        Ok(Some(details)) => details,
        Err(StorageError::SqliteError { message }) => message,
        Err(e) => return Err(e),
    };
    let corruption = StorageError::CorruptionDetected { details };
    tracing::warn!(error = %corruption, "discarding predictor tables");
    crate::schema::reset(conn)?;
    Ok(true)
}
