//! Structured JSON logging.
//!
//! Every component of the engine logs through `tracing`. When logging is
//! enabled, events are written as JSON lines to `navdeck-<run id>.json`
//! inside the configured directory, through a non-blocking writer. The run
//! id is a UUID v7, so file names sort chronologically and the oldest files
//! are the first ones removed once `max-files` is exceeded.
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! max-files = 3
//! directory = "logs"
//! ```
//!
//! `RUST_LOG` takes precedence over `level`, e.g.
//! `RUST_LOG=navdeck_core::view::nav_bar=trace,info`.

use crate::settings::LoggingSettings;
use anyhow::{Context, Error};
use std::fs;
use std::fs::DirEntry;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const LOG_FILE_PREFIX: &str = "navdeck-";
const LOG_FILE_SUFFIX: &str = "json";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

static LOG_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Identifier of this process run, generated on first access.
pub fn get_run_id() -> &'static str {
    RUN_ID.get_or_init(|| Uuid::now_v7().to_string()).as_str()
}

/// Name of the log file written by this run.
pub fn log_file_name() -> String {
    format!("{}{}.{}", LOG_FILE_PREFIX, get_run_id(), LOG_FILE_SUFFIX)
}

/// Deletes the oldest run logs of `log_dir` so that at most `max_files`
/// remain. Zero keeps everything.
fn cleanup_run_logs(log_dir: &Path, max_files: usize) -> Result<(), Error> {
    if max_files == 0 {
        return Ok(());
    }

    let mut entries = collect_run_log_entries(log_dir)?;
    if entries.len() <= max_files {
        return Ok(());
    }

    entries.sort_by_key(|entry| entry.file_name());
    let remove_count = entries.len().saturating_sub(max_files);
    for entry in entries.into_iter().take(remove_count) {
        fs::remove_file(entry.path())
            .with_context(|| format!("can't remove old log file {}", entry.path().display()))?;
    }

    Ok(())
}

fn collect_run_log_entries(log_dir: &Path) -> Result<Vec<DirEntry>, Error> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(log_dir)
        .with_context(|| format!("can't read log directory {}", log_dir.display()))?
    {
        let entry = entry.context("can't read log directory entry")?;
        if is_run_log_entry(&entry) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

fn is_run_log_entry(entry: &DirEntry) -> bool {
    let file_name = entry.file_name();
    let file_name = file_name.to_string_lossy();

    file_name.starts_with(LOG_FILE_PREFIX) && file_name.ends_with(LOG_FILE_SUFFIX)
}

/// Installs the global JSON subscriber. Does nothing when logging is
/// disabled.
///
/// A relative `directory` is resolved against the current working
/// directory. Fails if a subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), Error> {
    if !settings.enabled {
        return Ok(());
    }

    let log_dir = if settings.directory.is_absolute() {
        settings.directory.clone()
    } else {
        std::env::current_dir()
            .context("can't get current working directory")?
            .join(&settings.directory)
    };
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("can't create log directory {}", log_dir.display()))?;

    cleanup_run_logs(&log_dir, settings.max_files)?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(format!("{}{}", LOG_FILE_PREFIX, get_run_id()))
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(settings.max_files.max(1))
        .build(&log_dir)
        .context("can't initialize log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(Mutex::new(Some(guard)));

    let filter = build_filter(settings)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_current_span(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("can't initialize tracing subscriber")?;

    tracing::info!(
        run_id = get_run_id(),
        version = env!("CARGO_PKG_VERSION"),
        "logging started"
    );

    Ok(())
}

/// Flushes and releases the file writer.
///
/// Waits at most five seconds for the writer thread.
pub fn shutdown_logging() {
    let Some(mutex) = LOG_GUARD.get() else {
        return;
    };

    let Some(guard) = mutex.lock().ok().and_then(|mut guard| guard.take()) else {
        return;
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        drop(guard);
        let _ = tx.send(());
    });

    let _ = rx.recv_timeout(SHUTDOWN_TIMEOUT);
}

fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = settings.level.trim();
    let level = if level.is_empty() { "info" } else { level };

    EnvFilter::builder()
        .parse(level)
        .with_context(|| format!("invalid logging level {:?}", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_log_file(dir: &Path, index: usize) -> Result<(), Error> {
        let file_name = format!("{}{:04}.{}", LOG_FILE_PREFIX, index, LOG_FILE_SUFFIX);
        fs::write(dir.join(file_name), b"{}")?;
        Ok(())
    }

    fn collect_log_file_names(dir: &Path) -> Result<Vec<String>, Error> {
        let mut entries = collect_run_log_entries(dir)?;
        entries.sort_by_key(|entry| entry.file_name());
        Ok(entries
            .into_iter()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect())
    }

    #[test]
    fn cleanup_keeps_the_most_recent_logs() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 1..=5 {
            create_log_file(temp_dir.path(), index)?;
        }

        cleanup_run_logs(temp_dir.path(), 2)?;

        assert_eq!(
            collect_log_file_names(temp_dir.path())?,
            vec!["navdeck-0004.json", "navdeck-0005.json"]
        );

        Ok(())
    }

    #[test]
    fn cleanup_with_zero_limit_keeps_everything() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 1..=3 {
            create_log_file(temp_dir.path(), index)?;
        }

        cleanup_run_logs(temp_dir.path(), 0)?;

        assert_eq!(collect_log_file_names(temp_dir.path())?.len(), 3);

        Ok(())
    }

    #[test]
    fn cleanup_ignores_foreign_files() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 1..=3 {
            create_log_file(temp_dir.path(), index)?;
        }
        fs::write(temp_dir.path().join("settings.toml"), b"")?;
        fs::write(temp_dir.path().join("navdeck-notes.txt"), b"")?;

        cleanup_run_logs(temp_dir.path(), 1)?;

        assert_eq!(collect_log_file_names(temp_dir.path())?, vec!["navdeck-0003.json"]);
        assert!(temp_dir.path().join("settings.toml").exists());
        assert!(temp_dir.path().join("navdeck-notes.txt").exists());

        Ok(())
    }

    #[test]
    fn run_id_is_stable_and_names_the_log_file() {
        let run_id = get_run_id();

        assert_eq!(get_run_id(), run_id);
        assert!(Uuid::parse_str(run_id).is_ok());
        assert_eq!(log_file_name(), format!("navdeck-{}.json", run_id));
    }

    #[test]
    fn disabled_logging_is_a_no_op() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let settings = LoggingSettings {
            enabled: false,
            directory: temp_dir.path().join("logs"),
            ..Default::default()
        };

        init_logging(&settings)?;

        assert!(!temp_dir.path().join("logs").exists());

        Ok(())
    }

    #[test]
    fn invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let settings = LoggingSettings {
            level: "navdeck_core=loud".to_string(),
            ..Default::default()
        };

        assert!(build_filter(&settings).is_err());
    }
}
