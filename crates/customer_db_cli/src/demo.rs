//! Demonstration sequence over the customer repository.
//!
//! # Responsibility
//! - Run schema setup, reset and one full customer lifecycle in order.
//! - Print one status line per step and every search row.
//!
//! # Invariants
//! - The first failing step stops the run; later steps never execute.
//! - Reset runs before any insert, so repeated runs assign the same ids.

use customer_db_core::{
    CustomerId, CustomerMatch, CustomerRepository, PhoneId, StoreError, StoreResult,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};

const DEMO_FIRST_NAME: &str = "Ivan";
const DEMO_LAST_NAME: &str = "Ivanov";
const DEMO_EMAIL: &str = "john.jonovich@gmail.ru";
const DEMO_UPDATED_EMAIL: &str = "john.jonovich@yandex.ru";
const DEMO_PHONE: &str = "+1234567890";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    JsonLines,
}

#[derive(Debug)]
pub enum DemoError {
    Store {
        step: &'static str,
        source: StoreError,
    },
    Output(io::Error),
}

impl Display for DemoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { step, source } => write!(f, "error {step}: {source}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl Error for DemoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(value: io::Error) -> Self {
        Self::Output(value)
    }
}

/// Ids and counts produced by a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSummary {
    pub customer_id: CustomerId,
    pub phone_id: PhoneId,
    pub matches: usize,
}

/// Runs the demonstration sequence, writing status lines to `out`.
pub fn run_demo<R, W>(
    repo: &R,
    out: &mut W,
    format: OutputFormat,
) -> Result<DemoSummary, DemoError>
where
    R: CustomerRepository,
    W: Write,
{
    step("creating tables", repo.initialize_schema())?;
    writeln!(out, "Tables created successfully.")?;

    step("clearing tables", repo.reset_all())?;
    writeln!(out, "Tables cleared successfully.")?;

    let customer_id = step(
        "adding customer",
        repo.add_customer(DEMO_FIRST_NAME, DEMO_LAST_NAME, DEMO_EMAIL),
    )?;
    writeln!(out, "Customer added successfully (id {customer_id}).")?;

    let phone_id = step("adding phone", repo.add_phone(customer_id, DEMO_PHONE))?;
    writeln!(out, "Phone added successfully (id {phone_id}).")?;

    step(
        "updating customer",
        repo.update_customer(customer_id, DEMO_FIRST_NAME, DEMO_LAST_NAME, DEMO_UPDATED_EMAIL),
    )?;
    writeln!(out, "Customer updated successfully.")?;

    let matches = step("finding customer", repo.find_customers(DEMO_UPDATED_EMAIL))?;
    let match_count = matches.len();
    for row in matches {
        write_match(out, &row, format)?;
    }

    step("deleting phone", repo.delete_phone(phone_id))?;
    writeln!(out, "Phone deleted successfully.")?;

    step("deleting customer", repo.delete_customer(customer_id))?;
    writeln!(out, "Customer deleted successfully.")?;

    Ok(DemoSummary {
        customer_id,
        phone_id,
        matches: match_count,
    })
}

fn step<T>(step: &'static str, result: StoreResult<T>) -> Result<T, DemoError> {
    result.map_err(|source| DemoError::Store { step, source })
}

fn write_match<W: Write>(
    out: &mut W,
    row: &CustomerMatch,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(
            out,
            "ID: {}, Name: {}, Email: {}, Phone: {}",
            row.id,
            row.full_name(),
            row.email,
            row.phone_number.as_deref().unwrap_or("-")
        ),
        OutputFormat::JsonLines => {
            serde_json::to_writer(&mut *out, row)?;
            writeln!(out)
        }
    }
}
