use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Payload-file discovery ─────────────────────────────────────────────────────

/// Resolve the payload file to read.
///
/// An explicitly configured path always wins, whether or not it exists.
/// Otherwise the following candidates are checked in order and the first
/// existing one returned:
/// 1. `./dashboard_data.json`
/// 2. `~/.budget-dashboard/dashboard_data.json`
///
/// When neither exists the first candidate is returned anyway; the loader
/// degrades to the empty dataset on a missing file.
pub fn resolve_data_file(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let cwd_candidate = PathBuf::from("dashboard_data.json");
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let home_candidate = home.join(".budget-dashboard").join("dashboard_data.json");

    if cwd_candidate.exists() {
        cwd_candidate
    } else if home_candidate.exists() {
        home_candidate
    } else {
        cwd_candidate
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
