//! Value coercion for heterogeneous spreadsheet cells.
//!
//! Source spreadsheets mix numbers, numeric strings, blanks and pandas
//! artifacts (`"nan"`, `"None"`) in the same columns. Every helper here
//! degrades silently to a safe default instead of propagating an error.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

// ── Numeric coercion ──────────────────────────────────────────────────────────

/// Coerce a JSON value to a finite `f64`, falling back to `0.0`.
///
/// Mirrors the loose coercion the source data was produced under:
/// * numbers pass through (non-finite → 0);
/// * strings are trimmed and parsed (empty or non-numeric → 0);
/// * booleans coerce to 1/0;
/// * null, arrays and objects → 0.
pub fn to_number(value: &Value) -> f64 {
    let num = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    if num.is_finite() {
        num
    } else {
        0.0
    }
}

// ── Token normalization ───────────────────────────────────────────────────────

/// Normalize a cell to a comparison token: trimmed, lower-cased, with the
/// pandas placeholders `"nan"` / `"none"` / `"null"` collapsed to empty.
pub fn normalize_token(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string().trim().to_lowercase(),
    };

    match text.as_str() {
        "nan" | "none" | "null" => String::new(),
        _ => text,
    }
}

// ── Month-key detection ───────────────────────────────────────────────────────

fn month_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("regex is valid"))
}

/// `true` when a field name denotes a monthly consumption column, i.e. it
/// starts with a `YYYY-MM-DD` date token (e.g. `"2025-03-01 00:00:00"`).
pub fn is_month_key(key: &str) -> bool {
    month_key_regex().is_match(key)
}

// ── Contract end-date parsing ─────────────────────────────────────────────────

/// Parse a contract end-date cell into a [`NaiveDate`].
///
/// Handles the formats seen across source spreadsheets: RFC 3339, ISO
/// date-time with or without fraction, bare ISO dates and Brazilian
/// `DD/MM/YYYY`. Anything else — including null and numeric cells — is
/// treated as "no date available" so expiry classification can fall back
/// to the status string.
pub fn parse_end_date(value: &Value) -> Option<NaiveDate> {
    let s = match value {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
