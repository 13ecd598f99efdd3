//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open the configured database file.
//! - Configure connection pragmas required by the repository contract.
//! - Fail early when the file is not a readable SQLite database.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Out-of-range busy timeouts fail as `DbError`, never as panics.
//! - Schema is not touched here; see `db::schema`.

use super::{DbError, DbResult};
use crate::config::{StoreConfig, MAX_BUSY_TIMEOUT_MS};
use log::{debug, error};
use rusqlite::Connection;
use std::time::Instant;

/// Opens a connection to the configured database file.
///
/// The file is created when missing.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(config: &StoreConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    debug!("event=db_open module=db status=start");

    let conn = match Connection::open(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection, config: &StoreConfig) -> DbResult<()> {
    // rusqlite panics on timeouts that overflow a C int of milliseconds.
    if config.busy_timeout.as_millis() > u128::from(MAX_BUSY_TIMEOUT_MS) {
        return Err(DbError::BusyTimeoutTooLarge(config.busy_timeout));
    }
    conn.busy_timeout(config.busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    // Reads the file header, so a non-database file fails here.
    conn.query_row("PRAGMA schema_version;", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}
