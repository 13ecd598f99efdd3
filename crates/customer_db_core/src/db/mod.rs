//! SQLite connection bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure one SQLite connection per repository call.
//! - Own the fixed DDL and reset scripts for the customer tables.
//!
//! # Invariants
//! - Every returned connection enforces foreign keys.
//! - Every returned connection waits at most `StoreConfig::busy_timeout` on locks.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;
pub mod schema;

pub use open::open_db;

pub type DbResult<T> = Result<T, DbError>;

/// Failure to obtain a usable connection.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Busy timeout does not fit SQLite's millisecond `int`.
    BusyTimeoutTooLarge(Duration),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::BusyTimeoutTooLarge(timeout) => write!(
                f,
                "busy timeout of {} ms exceeds the SQLite limit of {} ms",
                timeout.as_millis(),
                i32::MAX
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::BusyTimeoutTooLarge(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
