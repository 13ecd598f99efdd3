//! Customer repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide schema setup and CRUD/search primitives over `customers`/`phones`.
//! - Translate store failures into typed `StoreError` values.
//!
//! # Invariants
//! - Every call opens its own connection and transaction, and commits before
//!   returning. Errors drop the uncommitted transaction, which rolls it back.
//! - Missing ids on update/delete are silent successes reporting 0 rows.
//! - Search matches exact field values only.
//! - Search terms and personal fields are never logged.

use crate::config::StoreConfig;
use crate::db::schema::{apply_schema, reset_tables, RESET_SQL, SCHEMA_SQL};
use crate::db::{open_db, DbError};
use crate::model::customer::{Customer, CustomerId, CustomerMatch, Phone, PhoneId};
use log::{debug, error, info};
use rusqlite::{ffi, params, ErrorCode, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const INSERT_CUSTOMER_SQL: &str =
    "INSERT INTO customers (first_name, last_name, email) VALUES (?1, ?2, ?3);";

const INSERT_PHONE_SQL: &str = "INSERT INTO phones (customer_id, phone_number) VALUES (?1, ?2);";

const UPDATE_CUSTOMER_SQL: &str =
    "UPDATE customers SET first_name = ?1, last_name = ?2, email = ?3 WHERE id = ?4;";

const DELETE_PHONE_SQL: &str = "DELETE FROM phones WHERE id = ?1;";

const DELETE_CUSTOMER_SQL: &str = "DELETE FROM customers WHERE id = ?1;";

const FIND_CUSTOMERS_SQL: &str = "SELECT
    c.id,
    c.first_name,
    c.last_name,
    c.email,
    p.phone_number
FROM customers c
LEFT JOIN phones p ON c.id = p.customer_id
WHERE c.first_name = ?1
   OR c.last_name = ?1
   OR c.email = ?1
   OR p.phone_number = ?1
ORDER BY c.id ASC, p.id ASC;";

const GET_CUSTOMER_SQL: &str =
    "SELECT id, first_name, last_name, email FROM customers WHERE id = ?1;";

const LIST_PHONES_SQL: &str =
    "SELECT id, customer_id, phone_number FROM phones WHERE customer_id = ?1 ORDER BY id ASC;";

const BEGIN_SQL: &str = "BEGIN DEFERRED;";
const COMMIT_SQL: &str = "COMMIT;";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-enforced rule that rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    PrimaryKey,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKey,
            ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
            ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign_key",
            Self::NotNull => "not_null",
            Self::Check => "check",
            Self::PrimaryKey => "primary_key",
            Self::Other => "other",
        }
    }
}

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum StoreError {
    /// The store could not be opened or configured.
    Connection(DbError),
    /// A statement failed for a reason other than a constraint.
    Statement {
        statement: &'static str,
        source: rusqlite::Error,
    },
    /// A uniqueness, foreign-key or check rule rejected the write.
    ConstraintViolation {
        kind: ConstraintKind,
        statement: &'static str,
        message: String,
    },
    /// A persisted row could not be decoded.
    InvalidData(String),
}

impl StoreError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::ConstraintViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Statement text that failed, when the failure came from one.
    pub fn statement(&self) -> Option<&'static str> {
        match self {
            Self::Statement { statement, .. } | Self::ConstraintViolation { statement, .. } => {
                Some(*statement)
            }
            Self::Connection(_) | Self::InvalidData(_) => None,
        }
    }

    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "store_unavailable",
            Self::Statement { .. } => "statement_failed",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    fn from_statement(statement: &'static str, err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                return Self::ConstraintViolation {
                    kind: ConstraintKind::from_extended_code(failure.extended_code),
                    statement,
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                };
            }
        }

        if matches!(
            err,
            rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..)
        ) {
            return Self::InvalidData(err.to_string());
        }

        Self::Statement {
            statement,
            source: err,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "customer store unavailable: {err}"),
            Self::Statement { source, .. } => write!(f, "{source}"),
            Self::ConstraintViolation { kind, message, .. } => {
                write!(f, "{} constraint violated: {message}", kind.as_str())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted customer data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Statement { source, .. } => Some(source),
            Self::ConstraintViolation { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Connection(value)
    }
}

/// Single-pass sequence of search rows.
///
/// Rows are read before the search call returns, so the connection is
/// already closed while the caller iterates.
#[derive(Debug)]
pub struct CustomerMatches {
    rows: std::vec::IntoIter<CustomerMatch>,
}

impl CustomerMatches {
    fn new(rows: Vec<CustomerMatch>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for CustomerMatches {
    type Item = CustomerMatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for CustomerMatches {}

/// Repository interface for customer/phone persistence.
pub trait CustomerRepository {
    /// Creates both tables when absent. Safe to call repeatedly.
    fn initialize_schema(&self) -> StoreResult<()>;
    /// Deletes all rows and restarts both id sequences at 1.
    fn reset_all(&self) -> StoreResult<()>;
    fn add_customer(&self, first_name: &str, last_name: &str, email: &str)
        -> StoreResult<CustomerId>;
    fn add_phone(&self, customer_id: CustomerId, phone_number: &str) -> StoreResult<PhoneId>;
    /// Overwrites all mutable fields. Returns the number of rows changed.
    fn update_customer(
        &self,
        customer_id: CustomerId,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<usize>;
    fn delete_phone(&self, phone_id: PhoneId) -> StoreResult<usize>;
    /// Deletes one customer; the store cascades to its phones.
    fn delete_customer(&self, customer_id: CustomerId) -> StoreResult<usize>;
    /// Exact-match search over first name, last name, email and phone number.
    fn find_customers(&self, search_term: &str) -> StoreResult<CustomerMatches>;
    fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>>;
    fn list_phones(&self, customer_id: CustomerId) -> StoreResult<Vec<Phone>>;
}

/// SQLite-backed customer repository.
///
/// Holds only configuration; no connection outlives a single call.
#[derive(Debug, Clone)]
pub struct SqliteCustomerRepository {
    config: StoreConfig,
}

impl SqliteCustomerRepository {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `op` inside a fresh connection and transaction.
    ///
    /// # Side effects
    /// - Emits one `event=<event>` log line with status and duration
    ///   (`error` level on failure, `debug` on success).
    fn run<T, F>(&self, event: &'static str, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StoreResult<T>,
    {
        let started_at = Instant::now();
        let result = self.run_in_transaction(op);

        match &result {
            Ok(_) => debug!(
                "event={event} module=repo status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={event} module=repo status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }

        result
    }

    fn run_in_transaction<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StoreResult<T>,
    {
        let mut conn = open_db(&self.config)?;
        let tx = conn
            .transaction()
            .map_err(|err| StoreError::from_statement(BEGIN_SQL, err))?;
        let value = op(&tx)?;
        tx.commit()
            .map_err(|err| StoreError::from_statement(COMMIT_SQL, err))?;
        Ok(value)
    }
}

impl CustomerRepository for SqliteCustomerRepository {
    fn initialize_schema(&self) -> StoreResult<()> {
        self.run("schema_init", |tx| {
            apply_schema(tx).map_err(|err| StoreError::from_statement(SCHEMA_SQL, err))
        })?;
        info!("event=schema_init module=repo status=ok");
        Ok(())
    }

    fn reset_all(&self) -> StoreResult<()> {
        self.run("reset_all", |tx| {
            reset_tables(tx).map_err(|err| StoreError::from_statement(RESET_SQL, err))
        })?;
        info!("event=reset_all module=repo status=ok");
        Ok(())
    }

    fn add_customer(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<CustomerId> {
        let id = self.run("customer_add", |tx| {
            tx.execute(INSERT_CUSTOMER_SQL, params![first_name, last_name, email])
                .map_err(|err| StoreError::from_statement(INSERT_CUSTOMER_SQL, err))?;
            Ok(tx.last_insert_rowid())
        })?;
        info!("event=customer_add module=repo status=ok customer_id={id}");
        Ok(id)
    }

    fn add_phone(&self, customer_id: CustomerId, phone_number: &str) -> StoreResult<PhoneId> {
        let id = self.run("phone_add", |tx| {
            tx.execute(INSERT_PHONE_SQL, params![customer_id, phone_number])
                .map_err(|err| StoreError::from_statement(INSERT_PHONE_SQL, err))?;
            Ok(tx.last_insert_rowid())
        })?;
        info!("event=phone_add module=repo status=ok customer_id={customer_id} phone_id={id}");
        Ok(id)
    }

    fn update_customer(
        &self,
        customer_id: CustomerId,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<usize> {
        let changed = self.run("customer_update", |tx| {
            tx.execute(
                UPDATE_CUSTOMER_SQL,
                params![first_name, last_name, email, customer_id],
            )
            .map_err(|err| StoreError::from_statement(UPDATE_CUSTOMER_SQL, err))
        })?;
        info!(
            "event=customer_update module=repo status=ok customer_id={customer_id} rows={changed}"
        );
        Ok(changed)
    }

    fn delete_phone(&self, phone_id: PhoneId) -> StoreResult<usize> {
        let changed = self.run("phone_delete", |tx| {
            tx.execute(DELETE_PHONE_SQL, [phone_id])
                .map_err(|err| StoreError::from_statement(DELETE_PHONE_SQL, err))
        })?;
        info!("event=phone_delete module=repo status=ok phone_id={phone_id} rows={changed}");
        Ok(changed)
    }

    fn delete_customer(&self, customer_id: CustomerId) -> StoreResult<usize> {
        let changed = self.run("customer_delete", |tx| {
            tx.execute(DELETE_CUSTOMER_SQL, [customer_id])
                .map_err(|err| StoreError::from_statement(DELETE_CUSTOMER_SQL, err))
        })?;
        info!(
            "event=customer_delete module=repo status=ok customer_id={customer_id} rows={changed}"
        );
        Ok(changed)
    }

    fn find_customers(&self, search_term: &str) -> StoreResult<CustomerMatches> {
        let rows = self.run("customer_find", |tx| {
            let to_store_error =
                |err: rusqlite::Error| StoreError::from_statement(FIND_CUSTOMERS_SQL, err);
            let mut stmt = tx.prepare(FIND_CUSTOMERS_SQL).map_err(to_store_error)?;
            let mut rows = stmt.query([search_term]).map_err(to_store_error)?;
            let mut matches = Vec::new();

            while let Some(row) = rows.next().map_err(to_store_error)? {
                matches.push(parse_match_row(row).map_err(to_store_error)?);
            }

            Ok(matches)
        })?;
        info!(
            "event=customer_find module=repo status=ok term_len={} rows={}",
            search_term.chars().count(),
            rows.len()
        );
        Ok(CustomerMatches::new(rows))
    }

    fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>> {
        self.run("customer_get", |tx| {
            tx.query_row(GET_CUSTOMER_SQL, [customer_id], parse_customer_row)
                .optional()
                .map_err(|err| StoreError::from_statement(GET_CUSTOMER_SQL, err))
        })
    }

    fn list_phones(&self, customer_id: CustomerId) -> StoreResult<Vec<Phone>> {
        self.run("phone_list", |tx| {
            let to_store_error =
                |err: rusqlite::Error| StoreError::from_statement(LIST_PHONES_SQL, err);
            let mut stmt = tx.prepare(LIST_PHONES_SQL).map_err(to_store_error)?;
            let phones = stmt
                .query_map([customer_id], parse_phone_row)
                .map_err(to_store_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(to_store_error)?;
            Ok(phones)
        })
    }
}

fn parse_match_row(row: &Row<'_>) -> rusqlite::Result<CustomerMatch> {
    Ok(CustomerMatch {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
    })
}

fn parse_customer_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
    })
}

fn parse_phone_row(row: &Row<'_>) -> rusqlite::Result<Phone> {
    Ok(Phone {
        id: row.get("id")?,
        customer_id: row.get("customer_id")?,
        phone_number: row.get("phone_number")?,
    })
}
