//! Process logging bootstrap.
//!
//! # Responsibility
//! - Initialize the `log` backend exactly once per process.
//! - Route records to rolling files when a directory is given, stderr otherwise.
//!
//! # Invariants
//! - A repeated call with the same level and destination is a no-op.
//! - A repeated call with a different level or destination is rejected.
//! - Log lines carry ids and counts, never customer names, emails or phones.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "customer_db";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    log_dir: Option<PathBuf>,
    _handle: LoggerHandle,
}

/// Initializes logging with `level`, writing to `log_dir` when given.
///
/// # Errors
/// - Returns an error when `level` is not one of trace|debug|info|warn|error.
/// - Returns an error when `log_dir` is blank, relative, or cannot be created.
/// - Returns an error when logging is already active with other settings.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level = parse_level(level)?;
    let log_dir = log_dir.map(parse_log_dir).transpose()?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| -> Result<ActiveLogger, String> {
        let handle = start_logger(level, log_dir.as_deref())?;
        info!(
            "event=logging_init module=core status=ok level={} destination={} version={}",
            level,
            destination_label(log_dir.as_deref()),
            env!("CARGO_PKG_VERSION")
        );
        Ok(ActiveLogger {
            level,
            log_dir: log_dir.clone(),
            _handle: handle,
        })
    })?;

    if active.level != level || active.log_dir != log_dir {
        return Err(format!(
            "logging already active ({} -> {}); refusing to switch to ({} -> {})",
            active.level,
            destination_label(active.log_dir.as_deref()),
            level,
            destination_label(log_dir.as_deref())
        ));
    }

    Ok(())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: LevelFilter, log_dir: Option<&Path>) -> Result<LoggerHandle, String> {
    let logger = Logger::with(LogSpecification::builder().default(level).build());

    let logger = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir)
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
        None => logger.log_to_stderr().format(flexi_logger::default_format),
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let trimmed = raw.trim();
    let candidate = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match candidate.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{trimmed}`; expected trace|debug|info|warn|error"
        )),
        Ok(level) => Ok(level),
    }
}

fn parse_log_dir(raw: &str) -> Result<PathBuf, String> {
    let path = Path::new(raw.trim());
    if path.as_os_str().is_empty() {
        return Err("log directory cannot be empty".to_string());
    }
    if !path.is_absolute() {
        return Err(format!(
            "log directory must be absolute, got `{}`",
            path.display()
        ));
    }
    Ok(path.to_path_buf())
}

fn destination_label(log_dir: Option<&Path>) -> String {
    log_dir.map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string())
}
