//! Row normalizer: one raw line item in, one clean numeric record out.
//!
//! Source spreadsheets report execution inconsistently across units: some
//! fill `Executado_Total` directly, some only carry monthly consumption
//! columns, some only commitment balances. The executed amount is therefore
//! resolved through an explicit ordered candidate list — informed figure,
//! derived monthly sum, committed amount — taking the first nonzero value.

use dashboard_core::coerce::{is_month_key, to_number};
use dashboard_core::models::{BudgetRow, NormalizedRow};
use serde_json::Value;

// ── Public API ────────────────────────────────────────────────────────────────

/// Sum every month-keyed column of the row (names starting `YYYY-MM-DD`).
pub fn sum_month_values(row: &BudgetRow) -> f64 {
    row.extra
        .iter()
        .filter(|(key, _)| is_month_key(key))
        .map(|(_, value)| to_number(value))
        .sum()
}

/// Normalize one raw row into a record with guaranteed numeric fields.
///
/// Coercion failures degrade to zero; the function has no error path. All
/// original fields pass through, with the four derived fields overwriting
/// their raw counterparts.
pub fn normalize_row(mut row: BudgetRow) -> NormalizedRow {
    let total_estimado = to_number(&row.total_anual_estimado);
    let executado_informado = to_number(&row.executado_total);
    let empenho_rap = to_number(&row.total_empenho_rap);
    let saldo_ano = to_number(&row.saldo_empenhos_2025);
    let saldo_rap = to_number(&row.saldo_empenhos_rap);
    let meses = sum_month_values(&row);

    let comprometido = first_nonzero(&[empenho_rap, saldo_ano + saldo_rap]);
    let executado = first_nonzero(&[executado_informado, meses, comprometido]);

    let taxa_execucao = if total_estimado > 0.0 {
        (executado / total_estimado) * 100.0
    } else {
        0.0
    };

    // The derived fields replace the raw cells; clearing them here keeps
    // each key serializing exactly once through the flattened source.
    row.total_anual_estimado = Value::Null;
    row.executado_total = Value::Null;
    row.total_empenho_rap = Value::Null;
    row.taxa_execucao = Value::Null;

    NormalizedRow {
        total_anual_estimado: total_estimado,
        total_empenho_rap: comprometido,
        executado_total: executado,
        taxa_execucao,
        source: row,
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// First nonzero candidate, or zero when every candidate is zero.
fn first_nonzero(candidates: &[f64]) -> f64 {
    candidates.iter().copied().find(|v| *v != 0.0).unwrap_or(0.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
