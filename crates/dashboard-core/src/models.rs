//! Data model for the budget dashboard.
//!
//! Spreadsheet rows arrive with an open-ended column set: a handful of known
//! budget fields plus arbitrary pass-through columns (monthly consumption
//! columns keyed by dates, internal codes, free text). The known fields are
//! typed here as loose [`Value`]s — cells may hold strings or numbers — and
//! everything else lands in a flattened extra bag so nothing is lost on the
//! way through the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Grouping key used when a row carries no organizational unit (UGR).
pub const UGR_NOT_INFORMED: &str = "Não informado";

/// Default lookahead window, in days, for "expiring soon" contract alerts.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 60;

// ── BudgetRow ─────────────────────────────────────────────────────────────────

/// One raw budget line item as produced by spreadsheet ingestion.
///
/// All known fields default to JSON null when absent and are skipped on
/// serialization, so a round-trip reproduces only the columns the source
/// actually had.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetRow {
    /// Organizational/managing unit identifier.
    #[serde(rename = "UGR", default, skip_serializing_if = "Value::is_null")]
    pub ugr: Value,

    /// Expense description.
    #[serde(rename = "Despesa", default, skip_serializing_if = "Value::is_null")]
    pub despesa: Value,

    /// Internal plan (PI) code.
    #[serde(rename = "PI_2025", default, skip_serializing_if = "Value::is_null")]
    pub pi: Value,

    /// Estimated annual total for the line item.
    #[serde(rename = "Total_Anual_Estimado", default, skip_serializing_if = "Value::is_null")]
    pub total_anual_estimado: Value,

    /// Explicitly informed executed total.
    #[serde(rename = "Executado_Total", default, skip_serializing_if = "Value::is_null")]
    pub executado_total: Value,

    /// Committed total (current-year commitments plus carryover, RAP).
    #[serde(rename = "Total_Empenho_RAP", default, skip_serializing_if = "Value::is_null")]
    pub total_empenho_rap: Value,

    /// Remaining balance on current-year commitments.
    #[serde(rename = "Saldo_Empenhos_2025", default, skip_serializing_if = "Value::is_null")]
    pub saldo_empenhos_2025: Value,

    /// Remaining balance on carried-over (RAP) commitments.
    #[serde(rename = "Saldo_Empenhos_RAP", default, skip_serializing_if = "Value::is_null")]
    pub saldo_empenhos_rap: Value,

    /// Contract validity end date.
    #[serde(rename = "Data_Vigencia_Fim", default, skip_serializing_if = "Value::is_null")]
    pub data_vigencia_fim: Value,

    /// Contract status string (e.g. "VIGENTE", "VENCIDO", "VENCENDO").
    #[serde(rename = "Status_Contrato", default, skip_serializing_if = "Value::is_null")]
    pub status_contrato: Value,

    /// Execution percentage, when the source already carries one.
    #[serde(rename = "Taxa_Execucao", default, skip_serializing_if = "Value::is_null")]
    pub taxa_execucao: Value,

    /// Every other column, month-keyed consumption columns included.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BudgetRow {
    /// The description cell, falling back to the lower-case `descricao`
    /// variant some exports use when the primary cell is blank.
    pub fn description_cell(&self) -> &Value {
        self.cell_or_extra(&self.despesa, "descricao")
    }

    /// The unit cell, falling back to the lower-case `ugr` variant.
    pub fn unit_cell(&self) -> &Value {
        self.cell_or_extra(&self.ugr, "ugr")
    }

    /// The PI-code cell, falling back to the lower-case `pi` variant.
    pub fn pi_cell(&self) -> &Value {
        self.cell_or_extra(&self.pi, "pi")
    }

    fn cell_or_extra<'a>(&'a self, primary: &'a Value, key: &str) -> &'a Value {
        if cell_is_blank(primary) {
            self.extra.get(key).unwrap_or(&Value::Null)
        } else {
            primary
        }
    }

    /// Grouping key for unit rollups: the UGR cell when it holds something,
    /// otherwise the [`UGR_NOT_INFORMED`] sentinel. Empty strings, zero and
    /// null all fall back to the sentinel.
    pub fn unit_key(&self) -> String {
        match &self.ugr {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => {
                if n.as_f64() == Some(0.0) {
                    UGR_NOT_INFORMED.to_string()
                } else {
                    n.to_string()
                }
            }
            Value::Bool(true) => "true".to_string(),
            _ => UGR_NOT_INFORMED.to_string(),
        }
    }
}

/// Blank in the loose sense the original data layer used: null, empty
/// string, zero or `false`.
fn cell_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(b) => !b,
        _ => false,
    }
}

// ── NormalizedRow ─────────────────────────────────────────────────────────────

/// A [`BudgetRow`] with four guaranteed numeric fields derived by the
/// normalizer. The flattened source keeps every original column; its copies
/// of the four derived fields are cleared to null by the normalizer so each
/// key serializes exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Estimated annual total, coerced to a number.
    #[serde(rename = "Total_Anual_Estimado")]
    pub total_anual_estimado: f64,

    /// Committed amount: informed commitments, or the summed balance fields.
    #[serde(rename = "Total_Empenho_RAP")]
    pub total_empenho_rap: f64,

    /// Executed amount resolved through the fallback chain.
    #[serde(rename = "Executado_Total")]
    pub executado_total: f64,

    /// Execution percentage; 0 when there is no positive estimate.
    #[serde(rename = "Taxa_Execucao")]
    pub taxa_execucao: f64,

    /// The original row, all other fields passing through unchanged.
    #[serde(flatten)]
    pub source: BudgetRow,
}

// ── UgrRollup ─────────────────────────────────────────────────────────────────

/// Per-unit execution summary, rebuilt from scratch on every aggregation
/// pass. Active plus expired contract counts always equal the number of rows
/// attributed to the unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UgrRollup {
    #[serde(rename = "UGR")]
    pub ugr: String,
    #[serde(rename = "Total_Anual_Estimado")]
    pub total_anual_estimado: f64,
    #[serde(rename = "Total_Empenho_RAP")]
    pub total_empenho_rap: f64,
    #[serde(rename = "Executado_Total")]
    pub executado_total: f64,
    #[serde(rename = "Comprometido_Total")]
    pub comprometido_total: f64,
    #[serde(rename = "Contratos_Ativos")]
    pub contratos_ativos: u32,
    #[serde(rename = "Contratos_Expirados")]
    pub contratos_expirados: u32,
    #[serde(rename = "Percentual_Execucao")]
    pub percentual_execucao: f64,
}

// ── DashboardKpis ─────────────────────────────────────────────────────────────

/// Global KPI record summarizing all normalized rows.
///
/// The source payload may carry a partial KPI object; unknown fields are
/// preserved in `extra` and the computed fields overlay any pre-existing
/// values of the same name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    #[serde(default)]
    pub total_anual_estimado: f64,
    /// Executed total across all rows.
    #[serde(default)]
    pub total_empenhado: f64,
    #[serde(default)]
    pub total_comprometido: f64,
    /// Remaining balance: estimate minus executed, floored at zero.
    #[serde(default)]
    pub saldo_a_empenhar: f64,
    #[serde(default)]
    pub percentual_execucao: f64,
    /// Same value as `percentual_execucao`, kept for payload compatibility.
    #[serde(default)]
    pub taxa_execucao: f64,
    #[serde(default)]
    pub count_expiring_contracts: u32,
    #[serde(default)]
    pub count_expired_contracts: u32,

    /// Pre-existing KPI fields the pipeline does not compute.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── DashboardPayload ──────────────────────────────────────────────────────────

/// The source document read from the backing store.
///
/// Only `raw_data_for_filters` is interpreted; the monthly consumption and
/// expiry-list sections are passed through untouched, and any other section
/// survives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub kpis: DashboardKpis,
    #[serde(default)]
    pub monthly_consumption: Vec<Value>,
    #[serde(default)]
    pub expiring_contracts_list: Vec<Value>,
    #[serde(default)]
    pub expired_contracts_list: Vec<Value>,
    #[serde(default)]
    pub raw_data_for_filters: Vec<BudgetRow>,

    /// Unrecognized payload sections, passed through to the dataset.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── DashboardDataset ──────────────────────────────────────────────────────────

/// The fully derived, cached dataset served to the presentation layer.
///
/// Replaced wholesale on every rebuild, never merged. `Default` yields the
/// well-defined empty dataset (all sums zero, all lists empty) used whenever
/// the source cannot be read — every accessor tolerates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDataset {
    pub kpis: DashboardKpis,
    pub ugr_analysis: Vec<UgrRollup>,
    pub monthly_consumption: Vec<Value>,
    pub expiring_contracts_list: Vec<Value>,
    pub expired_contracts_list: Vec<Value>,
    pub raw_data_for_filters: Vec<NormalizedRow>,

    /// Pass-through payload sections not interpreted by the pipeline.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
