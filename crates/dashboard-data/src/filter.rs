//! Row filter: drops subtotal lines and blank separators.
//!
//! Spreadsheet exports interleave real line items with "Total ..." summary
//! rows and empty spacer rows. The discard rules below reproduce the
//! behavior the dashboard has always had, in the exact branch order: the
//! early return on an empty description makes the final all-empty branch
//! unreachable, and a test pins that quirk so nobody "fixes" it silently.

use dashboard_core::coerce::normalize_token;
use dashboard_core::models::BudgetRow;

// ── Public API ────────────────────────────────────────────────────────────────

/// `true` when the row is a spreadsheet artifact rather than real data.
pub fn should_discard(row: &BudgetRow) -> bool {
    let description = normalize_token(row.description_cell());
    let ugr = normalize_token(row.unit_cell());
    let pi = normalize_token(row.pi_cell());

    if description.is_empty() {
        return false;
    }
    if description == "total" || description == "total geral" {
        return true;
    }
    if description.starts_with("total da") || description.starts_with("total de") {
        return true;
    }
    if description.starts_with("total ") && ugr.is_empty() {
        return true;
    }
    if description.is_empty() && ugr.is_empty() && pi.is_empty() {
        return true;
    }
    false
}

/// Keep only the rows that carry real data.
pub fn retain_data_rows(rows: Vec<BudgetRow>) -> Vec<BudgetRow> {
    rows.into_iter().filter(|row| !should_discard(row)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
