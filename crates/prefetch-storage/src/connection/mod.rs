//! Opening the predictor database, with self-heal for unreadable files.

pub mod pragmas;
pub mod transaction;

use std::path::Path;

use prefetch_core::config::StorageConfig;
use prefetch_core::errors::StorageError;
use rusqlite::{Connection, ErrorCode};

use self::pragmas::{apply_pragmas, verify_wal_mode};

/// Map a rusqlite error into the storage error space.
pub(crate) fn sql_error(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// True for errors meaning the file is not a usable SQLite database.
pub fn is_corruption(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.code,
            ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt
        ),
        _ => false,
    }
}

/// Result of opening a file-backed database.
pub struct OpenedConnection {
    pub conn: Connection,
    /// The previous file was unreadable and has been replaced.
    pub replaced_corrupt_file: bool,
}

/// Open a database file, apply pragmas.
///
/// A file that SQLite reports as corrupt or not-a-database is deleted
/// together with its WAL and shared-memory files, and a fresh database is
/// created in its place.
pub fn open_file(path: &Path, config: &StorageConfig) -> Result<OpenedConnection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                message: format!("create {}: {e}", parent.display()),
            })?;
        }
    }

    match probe(path) {
        Ok(conn) => {
            configure(&conn, config)?;
            Ok(OpenedConnection {
                conn,
                replaced_corrupt_file: false,
            })
        }
        Err(e) if is_corruption(&e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "predictor database unreadable, recreating"
            );
            remove_database_files(path)?;
            let conn = probe(path).map_err(sql_error)?;
            configure(&conn, config)?;
            Ok(OpenedConnection {
                conn,
                replaced_corrupt_file: true,
            })
        }
        Err(e) => Err(sql_error(e)),
    }
}

/// Open an in-memory database (for testing).
pub fn open_in_memory(config: &StorageConfig) -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(sql_error)?;
    apply_pragmas(&conn, config.effective_busy_timeout_ms())?;
    Ok(conn)
}

fn configure(conn: &Connection, config: &StorageConfig) -> Result<(), StorageError> {
    apply_pragmas(conn, config.effective_busy_timeout_ms())?;
    if !verify_wal_mode(conn)? {
        tracing::warn!("WAL journal mode unavailable, continuing with rollback journal");
    }
    Ok(())
}

/// Open and force SQLite to read the file header.
fn probe(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(conn)
}

fn remove_database_files(path: &Path) -> Result<(), StorageError> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        targets.push(name.into());
    }
    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::CorruptionDetected {
                    details: format!("cannot remove {}: {e}", target.display()),
                })
            }
        }
    }
    Ok(())
}
