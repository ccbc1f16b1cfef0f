//! Full derivation pipeline: payload in, dashboard dataset out.
//!
//! Filter → normalize → aggregate, then reassemble the payload with the
//! derived sections replacing their raw counterparts. The reference date is
//! injected by the caller (the loader uses the wall clock, tests a fixed
//! date).

use chrono::NaiveDate;
use dashboard_core::models::{DashboardDataset, DashboardKpis, DashboardPayload, NormalizedRow};
use tracing::debug;

use crate::aggregator::{build_kpis, build_ugr_analysis};
use crate::filter::retain_data_rows;
use crate::normalizer::normalize_row;

// ── Public API ────────────────────────────────────────────────────────────────

/// Derive the full dashboard dataset from a source payload.
///
/// The monthly consumption and expiry-list sections pass through untouched.
/// Computed KPI fields overlay any pre-existing KPI fields of the same name;
/// unrecognized KPI fields survive. Any `ugr_analysis` section in the source
/// is discarded in favor of the freshly built rollups.
pub fn build_dataset(
    payload: DashboardPayload,
    today: NaiveDate,
    window_days: i64,
) -> DashboardDataset {
    let source_count = payload.raw_data_for_filters.len();

    let kept = retain_data_rows(payload.raw_data_for_filters);
    let rows: Vec<NormalizedRow> = kept.into_iter().map(normalize_row).collect();

    debug!(
        source_rows = source_count,
        kept_rows = rows.len(),
        "payload rows filtered and normalized"
    );

    let ugr_analysis = build_ugr_analysis(&rows, today);
    let computed = build_kpis(&rows, today, window_days);
    let kpis = DashboardKpis {
        extra: payload.kpis.extra,
        ..computed
    };

    let mut extra = payload.extra;
    extra.remove("ugr_analysis");

    DashboardDataset {
        kpis,
        ugr_analysis,
        monthly_consumption: payload.monthly_consumption,
        expiring_contracts_list: payload.expiring_contracts_list,
        expired_contracts_list: payload.expired_contracts_list,
        raw_data_for_filters: rows,
        extra,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
