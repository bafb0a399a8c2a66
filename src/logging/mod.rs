//! Diagnostic logging setup.
//!
//! Installs a `tracing` subscriber whose level comes from the config. Output
//! goes to stderr, or to a daily file named `blog-admin_<date>.log` in the
//! configured log directory (default: `~/.local/share/blog-admin/logs/`).

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Install the global subscriber. Returns the log file path when logging to
/// a file.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let level = parse_level(&config.level);

    if !config.file {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
        return Ok(None);
    }

    let log_dir = resolve_log_dir(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_file_path(&log_dir, &chrono::Local::now().format("%Y-%m-%d").to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
    Ok(Some(path))
}

/// Map a config level name onto a `tracing` level. Unknown names fall back
/// to `info`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Expand a leading `~` in the configured directory.
pub fn resolve_log_dir(log_dir: &str) -> PathBuf {
    if let Some(rest) = log_dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if log_dir == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(log_dir)
}

fn log_file_path(log_dir: &Path, date: &str) -> PathBuf {
    log_dir.join(format!("blog-admin_{}.log", date))
}
