//! Customer database demonstration driver.
//!
//! Usage:
//! ```bash
//! CUSTOMER_DB_PATH=data/customers.db customer-db
//! customer-db --db data/customers.db --log-dir /tmp/customer-db-logs --json
//! ```
//!
//! Exits 0 when every step completes, 1 on the first failure.

use clap::Parser;
use customer_db_core::config::{load_env_file, ENV_DB_PATH};
use customer_db_core::{
    default_log_level, init_logging, ConfigError, LogConfig, SqliteCustomerRepository,
    StoreConfig, StoreError,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

mod demo;

use demo::{run_demo, DemoError, OutputFormat};

/// Runs the customer database demonstration sequence.
#[derive(Debug, Parser)]
#[command(name = "customer-db")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides CUSTOMER_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files (overrides CUSTOMER_DB_LOG_DIR)
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error (overrides CUSTOMER_DB_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Print search rows as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    Demo(DemoError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(message) => write!(f, "logging error: {message}"),
            Self::Demo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
            Self::Demo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DemoError> for CliError {
    fn from(value: DemoError) -> Self {
        Self::Demo(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=demo_run module=cli status=error error={err}");
            eprintln!("{}", describe_failure(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    load_env_file();
    init_cli_logging(cli)?;

    let config = resolve_store_config(cli)?;
    let repo = SqliteCustomerRepository::new(config);
    let format = if cli.json {
        OutputFormat::JsonLines
    } else {
        OutputFormat::Text
    };

    let mut stdout = std::io::stdout().lock();
    let summary = run_demo(&repo, &mut stdout, format)?;
    info!(
        "event=demo_run module=cli status=ok customer_id={} phone_id={} matches={}",
        summary.customer_id, summary.phone_id, summary.matches
    );
    Ok(())
}

fn init_cli_logging(cli: &Cli) -> Result<(), CliError> {
    let env = LogConfig::from_env();
    let log_dir = cli.log_dir.clone().or(env.log_dir);
    // Keep stderr quiet unless asked; status lines share the terminal.
    let fallback_level = if log_dir.is_some() {
        default_log_level()
    } else {
        "warn"
    };
    let level = cli
        .log_level
        .clone()
        .or(env.level)
        .unwrap_or_else(|| fallback_level.to_string());

    init_logging(&level, log_dir.as_deref()).map_err(CliError::Logging)
}

fn resolve_store_config(cli: &Cli) -> Result<StoreConfig, ConfigError> {
    let db_override = cli.db.as_ref().map(|path| path.display().to_string());
    StoreConfig::from_lookup(|key| {
        if key == ENV_DB_PATH {
            if let Some(path) = &db_override {
                return Some(path.clone());
            }
        }
        std::env::var(key).ok()
    })
}

fn describe_failure(err: &CliError) -> String {
    let CliError::Demo(DemoError::Store { step, source }) = err else {
        return format!("Error: {err}");
    };

    match source {
        StoreError::ConstraintViolation {
            kind, statement, ..
        } => format!(
            "Constraint violation while {step} ({}): {source}\nStatement: {}",
            kind.as_str(),
            statement.trim()
        ),
        StoreError::Statement { statement, .. } => format!(
            "Store error while {step}: {source}\nStatement: {}",
            statement.trim()
        ),
        StoreError::Connection(_) | StoreError::InvalidData(_) => {
            format!("Store error while {step}: {source}")
        }
    }
}
