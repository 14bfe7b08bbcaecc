//! Tracing setup: console output plus a timestamped log file per run.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// How many log files from previous runs survive startup.
const KEEP_PREVIOUS_LOGS: usize = 2;

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must live until the process exits.
pub fn init(logs_dir: &Path) -> Result<WorkerGuard, anyhow::Error> {
    std::fs::create_dir_all(logs_dir)?;
    let removed = prune_old_logs(logs_dir, KEEP_PREVIOUS_LOGS)?;

    let file_name = log_file_name(chrono::Local::now());
    let appender = tracing_appender::rolling::never(logs_dir, &file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()?;

    tracing::debug!(file = %file_name, removed, "Logging initialised");
    Ok(guard)
}

pub fn log_file_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("log-{}.log", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Delete `log-*.log` files in `dir` except the `keep` most recent ones.
/// Returns how many files were removed.
pub fn prune_old_logs(dir: &Path, keep: usize) -> std::io::Result<usize> {
    let mut logs: Vec<(std::time::SystemTime, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("log-") && name.ends_with(".log")
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, entry.path()))
        })
        .collect();

    // Newest first; ties broken by name, which embeds the timestamp.
    logs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    let mut removed = 0;
    for (_, path) in logs.into_iter().skip(keep) {
        std::fs::remove_file(&path)?;
        removed += 1;
    }
    Ok(removed)
}
