use std::path::PathBuf;

use clap::Parser;

use crate::models::DEFAULT_EXPIRY_WINDOW_DAYS;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Budget execution analytics for institutional spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "budget-dashboard",
    about = "Budget execution analytics for institutional spreadsheets",
    version
)]
pub struct Settings {
    /// Path to the dashboard payload JSON file (auto-discovered if omitted)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Lookahead window in days for expiring-contract alerts
    #[arg(long, default_value_t = DEFAULT_EXPIRY_WINDOW_DAYS, env = "LIMITE_DIAS_VENCIMENTO")]
    pub expiry_window_days: i64,

    /// Report view
    #[arg(long, default_value = "kpis", value_parser = ["kpis", "ugr", "rows"])]
    pub view: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from the process arguments.
    pub fn load() -> Self {
        Self::parse()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
