//! Rollups over normalized budget rows: per-unit summaries and global KPIs.
//!
//! Both rollups are rebuilt from scratch on every pass; nothing is mutated
//! incrementally. The reference date is injected so expiry classification
//! stays testable without a real clock.

use std::collections::HashMap;

use chrono::NaiveDate;
use dashboard_core::coerce::{parse_end_date, to_number};
use dashboard_core::models::{DashboardKpis, NormalizedRow, UgrRollup};
use serde_json::Value;

// ── Unit rollups ──────────────────────────────────────────────────────────────

/// Group rows by organizational unit and sum their execution figures.
///
/// A row counts as expired for its unit when its end date parses and lies
/// strictly before `today`, or when its status matches the expired code
/// ("VENC" without "VENCENDO" — the two status tokens share a stem, so the
/// longer one must be excluded explicitly). Output order is the insertion
/// order of first appearance; consumers sort as needed.
pub fn build_ugr_analysis(rows: &[NormalizedRow], today: NaiveDate) -> Vec<UgrRollup> {
    let mut rollups: Vec<UgrRollup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = row.source.unit_key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            rollups.push(UgrRollup {
                ugr: key,
                ..UgrRollup::default()
            });
            rollups.len() - 1
        });
        let stats = &mut rollups[slot];

        let comprometido = committed_amount(row);

        stats.total_anual_estimado += row.total_anual_estimado;
        stats.executado_total += row.executado_total;
        stats.total_empenho_rap += comprometido;
        stats.comprometido_total += comprometido;

        if is_expired(row, today) {
            stats.contratos_expirados += 1;
        } else {
            stats.contratos_ativos += 1;
        }
    }

    for stats in &mut rollups {
        stats.percentual_execucao = if stats.total_anual_estimado > 0.0 {
            (stats.executado_total / stats.total_anual_estimado) * 100.0
        } else {
            0.0
        };
    }

    rollups
}

// ── Global KPIs ───────────────────────────────────────────────────────────────

/// Sum all rows into the global KPI record.
///
/// The remaining balance is floored at zero. Expiry counting is per row:
/// when the end date parses, a day-difference within `[0, window_days]`
/// counts as expiring and a negative one as expired; the status-code
/// fallback applies only when no usable date exists.
pub fn build_kpis(rows: &[NormalizedRow], today: NaiveDate, window_days: i64) -> DashboardKpis {
    let total_estimado: f64 = rows.iter().map(|r| r.total_anual_estimado).sum();
    let executado: f64 = rows.iter().map(|r| r.executado_total).sum();
    let comprometido: f64 = rows.iter().map(committed_amount).sum();

    let saldo = (total_estimado - executado).max(0.0);
    let percentual = if total_estimado > 0.0 {
        (executado / total_estimado) * 100.0
    } else {
        0.0
    };

    let mut expiring = 0u32;
    let mut expired = 0u32;
    for row in rows {
        match parse_end_date(&row.source.data_vigencia_fim) {
            Some(vigencia) => {
                let diff = (vigencia - today).num_days();
                if (0..=window_days).contains(&diff) {
                    expiring += 1;
                } else if diff < 0 {
                    expired += 1;
                }
            }
            None => {
                if status_expired(&row.source.status_contrato) {
                    expired += 1;
                }
            }
        }
    }

    DashboardKpis {
        total_anual_estimado: total_estimado,
        total_empenhado: executado,
        total_comprometido: comprometido,
        saldo_a_empenhar: saldo,
        percentual_execucao: percentual,
        taxa_execucao: percentual,
        count_expiring_contracts: expiring,
        count_expired_contracts: expired,
        extra: serde_json::Map::new(),
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Committed amount for one row: the normalized commitment figure when
/// positive, otherwise the two raw balance fields summed.
fn committed_amount(row: &NormalizedRow) -> f64 {
    if row.total_empenho_rap > 0.0 {
        row.total_empenho_rap
    } else {
        to_number(&row.source.saldo_empenhos_2025) + to_number(&row.source.saldo_empenhos_rap)
    }
}

/// Upper-cased status text; null becomes empty.
fn status_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.to_uppercase(),
        other => other.to_string().to_uppercase(),
    }
}

/// Status-code expiry rule shared by both rollups.
fn status_expired(status: &Value) -> bool {
    let status = status_text(status);
    status.contains("VENC") && !status.contains("VENCENDO")
}

/// Unit-level expiry classification: end date in the past, or expired
/// status code. Unlike the KPI counting, the status rule is OR-ed in even
/// when a date is present.
fn is_expired(row: &NormalizedRow, today: NaiveDate) -> bool {
    let date_expired = parse_end_date(&row.source.data_vigencia_fim)
        .map(|vigencia| vigencia < today)
        .unwrap_or(false);
    date_expired || status_expired(&row.source.status_contrato)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
