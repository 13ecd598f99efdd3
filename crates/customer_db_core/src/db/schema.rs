//! Fixed DDL and reset scripts for the customer store.
//!
//! # Invariants
//! - `SCHEMA_SQL` only uses `IF NOT EXISTS`, so re-applying it is a no-op.
//! - `RESET_SQL` clears `phones` before `customers` (the referenced table)
//!   and restarts both identity sequences at 1.

use rusqlite::Connection;

/// Creates `customers` and `phones` when absent.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Deletes every row and rewinds the `AUTOINCREMENT` counters.
pub const RESET_SQL: &str = include_str!("reset.sql");

pub const CUSTOMERS_TABLE: &str = "customers";
pub const PHONES_TABLE: &str = "phones";

/// Applies `SCHEMA_SQL` on `conn`.
///
/// Callers own the surrounding transaction.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Applies `RESET_SQL` on `conn`.
///
/// Callers own the surrounding transaction.
pub fn reset_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(RESET_SQL)
}

/// Returns whether a table named `table_name` exists.
pub fn table_exists(conn: &Connection, table_name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get(0),
    )
}
