//! Modification-time keyed loader and the read-only query surface.
//!
//! Exactly one derived dataset exists at a time. It is rebuilt whenever the
//! store's fingerprint no longer matches the one recorded at the last
//! rebuild, and replaced wholesale in a single assignment — queries never
//! observe a partially updated dataset. A source that cannot be read or
//! parsed degrades to the empty default dataset; the failure is logged and
//! never surfaces to the presentation layer.

use std::time::SystemTime;

use chrono::NaiveDate;
use dashboard_core::models::{
    DashboardDataset, DashboardKpis, NormalizedRow, UgrRollup, DEFAULT_EXPIRY_WINDOW_DAYS,
};
use dashboard_data::pipeline::build_dataset;
use serde_json::Value;

use crate::store::PayloadStore;

// ── DashboardLoader ───────────────────────────────────────────────────────────

/// Cached loader over a [`PayloadStore`], invalidated by source modification
/// time or explicitly after an upload.
///
/// The reference date used for expiry classification is injectable so tests
/// can pin the clock.
pub struct DashboardLoader<S: PayloadStore> {
    store: S,
    expiry_window_days: i64,
    today: fn() -> NaiveDate,
    /// Most recently derived dataset.
    cache: Option<DashboardDataset>,
    /// Store fingerprint recorded when the cache was last rebuilt from a
    /// successful read. `None` marks the cache as never valid, forcing the
    /// next load to re-read.
    cached_fingerprint: Option<SystemTime>,
    /// Human-readable description of the last read failure.
    last_error: Option<String>,
}

impl<S: PayloadStore> DashboardLoader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
            today: current_date,
            cache: None,
            cached_fingerprint: None,
            last_error: None,
        }
    }

    /// Override the expiring-contract lookahead window.
    pub fn with_expiry_window(mut self, days: i64) -> Self {
        self.expiry_window_days = days;
        self
    }

    /// Override the reference-date source (tests pin this to a fixed date).
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Return the current dataset, rebuilding it when the source changed.
    pub fn load(&mut self) -> &DashboardDataset {
        let fingerprint = self.store.fingerprint();
        if self.is_cache_valid(fingerprint) {
            tracing::debug!("returning cached dashboard dataset");
        } else {
            self.refresh(fingerprint);
        }
        self.cache.get_or_insert_with(DashboardDataset::default)
    }

    /// Forget the recorded fingerprint so the next [`load`](Self::load)
    /// re-reads the source regardless of its modification time.
    pub fn invalidate(&mut self) {
        self.cached_fingerprint = None;
        tracing::debug!("dashboard cache invalidated");
    }

    /// Human-readable description of the last read failure, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Query surface ─────────────────────────────────────────────────────
    //
    // Each accessor returns an owned copy, so callers cannot corrupt the
    // cache by mutating what they receive.

    /// Global KPI record.
    pub fn kpis(&mut self) -> DashboardKpis {
        self.load().kpis.clone()
    }

    /// Per-unit rollups, in insertion order of first appearance.
    pub fn ugr_analysis(&mut self) -> Vec<UgrRollup> {
        self.load().ugr_analysis.clone()
    }

    /// Monthly consumption section, passed through from the source payload.
    pub fn monthly_consumption(&mut self) -> Vec<Value> {
        self.load().monthly_consumption.clone()
    }

    /// Expiring-contracts list, passed through from the source payload.
    pub fn expiring_contracts(&mut self) -> Vec<Value> {
        self.load().expiring_contracts_list.clone()
    }

    /// Expired-contracts list, passed through from the source payload.
    pub fn expired_contracts(&mut self) -> Vec<Value> {
        self.load().expired_contracts_list.clone()
    }

    /// All normalized rows that survived the filter.
    pub fn all_rows(&mut self) -> Vec<NormalizedRow> {
        self.load().raw_data_for_filters.clone()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache was built from a successful read whose
    /// fingerprint still matches the store.
    fn is_cache_valid(&self, fingerprint: Option<SystemTime>) -> bool {
        self.cache.is_some()
            && self.cached_fingerprint.is_some()
            && self.cached_fingerprint == fingerprint
    }

    /// Re-read the source and replace the cached dataset wholesale.
    fn refresh(&mut self, fingerprint: Option<SystemTime>) {
        match self.store.read_payload() {
            Ok(payload) => {
                let dataset = build_dataset(payload, (self.today)(), self.expiry_window_days);
                tracing::debug!(
                    rows = dataset.raw_data_for_filters.len(),
                    units = dataset.ugr_analysis.len(),
                    "dashboard dataset rebuilt"
                );
                self.cache = Some(dataset);
                self.cached_fingerprint = fingerprint;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load dashboard payload; serving empty dataset");
                self.last_error = Some(e.to_string());
                self.cache = Some(DashboardDataset::default());
                // Leave the fingerprint unset so every subsequent load
                // retries the source instead of pinning the empty dataset.
                self.cached_fingerprint = None;
            }
        }
    }
}

/// Wall-clock reference date used outside of tests.
fn current_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{store_payload, FilePayloadStore};
    use dashboard_core::error::{DashboardError, Result};
    use dashboard_core::models::DashboardPayload;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    // ── MemoryStore: injectable store double ──────────────────────────────────

    struct MemoryState {
        /// JSON content, or `None` to simulate a read failure.
        content: Option<String>,
        fingerprint: Option<SystemTime>,
        reads: u32,
    }

    #[derive(Clone)]
    struct MemoryStore(Rc<RefCell<MemoryState>>);

    impl MemoryStore {
        fn new(content: &str, stamp: u64) -> Self {
            Self(Rc::new(RefCell::new(MemoryState {
                content: Some(content.to_string()),
                fingerprint: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(stamp)),
                reads: 0,
            })))
        }

        fn set_content(&self, content: &str) {
            self.0.borrow_mut().content = Some(content.to_string());
        }

        fn set_stamp(&self, stamp: u64) {
            self.0.borrow_mut().fingerprint =
                Some(SystemTime::UNIX_EPOCH + Duration::from_secs(stamp));
        }

        fn fail_reads(&self) {
            self.0.borrow_mut().content = None;
        }

        fn reads(&self) -> u32 {
            self.0.borrow().reads
        }
    }

    impl PayloadStore for MemoryStore {
        fn fingerprint(&self) -> Option<SystemTime> {
            self.0.borrow().fingerprint
        }

        fn read_payload(&self) -> Result<DashboardPayload> {
            let mut state = self.0.borrow_mut();
            state.reads += 1;
            match &state.content {
                Some(content) => Ok(serde_json::from_str(content)?),
                None => Err(DashboardError::PayloadNotFound(PathBuf::from("<memory>"))),
            }
        }
    }

    fn sample_json(estimate: f64) -> String {
        format!(
            r#"{{"raw_data_for_filters": [
                {{"Despesa": "Aluguel", "UGR": "CPD",
                  "Total_Anual_Estimado": {estimate}, "Total_Empenho_RAP": 250}}
            ]}}"#
        )
    }

    fn loader(store: MemoryStore) -> DashboardLoader<MemoryStore> {
        DashboardLoader::new(store).with_today(fixed_today)
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_first_load_builds_dataset() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store);

        let dataset = mgr.load();
        assert_eq!(dataset.kpis.total_anual_estimado, 1000.0);
        assert_eq!(dataset.ugr_analysis.len(), 1);
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_unchanged_fingerprint_serves_cache() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store.clone());

        mgr.load();
        // Content changes but the fingerprint does not: the cache stands.
        store.set_content(&sample_json(9999.0));
        let dataset = mgr.load();

        assert_eq!(dataset.kpis.total_anual_estimado, 1000.0);
        assert_eq!(store.reads(), 1);
    }

    #[test]
    fn test_fingerprint_change_triggers_rebuild() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store.clone());

        mgr.load();
        store.set_content(&sample_json(2000.0));
        store.set_stamp(2);

        let dataset = mgr.load();
        assert_eq!(dataset.kpis.total_anual_estimado, 2000.0);
        assert_eq!(store.reads(), 2);
    }

    #[test]
    fn test_consecutive_loads_structurally_equal() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store);

        let first = mgr.load().clone();
        let second = mgr.load().clone();
        assert_eq!(first, second);
    }

    // ── invalidate ────────────────────────────────────────────────────────────

    #[test]
    fn test_invalidate_forces_reread_despite_same_fingerprint() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store.clone());

        mgr.load();
        store.set_content(&sample_json(2000.0));
        mgr.invalidate();

        let dataset = mgr.load();
        assert_eq!(dataset.kpis.total_anual_estimado, 2000.0);
        assert_eq!(store.reads(), 2);
    }

    // ── failure fallback ──────────────────────────────────────────────────────

    #[test]
    fn test_read_failure_serves_empty_default() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        store.fail_reads();
        let mut mgr = loader(store);

        let dataset = mgr.load();
        assert_eq!(*dataset, DashboardDataset::default());
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_recovers_after_failure() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        store.fail_reads();
        let mut mgr = loader(store.clone());

        assert_eq!(*mgr.load(), DashboardDataset::default());

        // Source comes back with the same fingerprint: the failed cache was
        // never marked valid, so the next load retries and succeeds.
        store.set_content(&sample_json(1000.0));
        let dataset = mgr.load();
        assert_eq!(dataset.kpis.total_anual_estimado, 1000.0);
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_corrupt_payload_serves_empty_default() {
        let store = MemoryStore::new("{not json{{", 1);
        let mut mgr = loader(store);

        let dataset = mgr.load();
        assert_eq!(*dataset, DashboardDataset::default());
        assert!(mgr.last_error().unwrap().contains("parse"));
    }

    // ── query surface ─────────────────────────────────────────────────────────

    #[test]
    fn test_accessors_return_current_values() {
        let store = MemoryStore::new(
            r#"{
                "raw_data_for_filters": [
                    {"Despesa": "Aluguel", "UGR": "CPD", "Total_Anual_Estimado": 1000}
                ],
                "monthly_consumption": [{"Mês": "2025-01", "Consumo_Mensal": 10.0}],
                "expiring_contracts_list": [{"Despesa": "X"}],
                "expired_contracts_list": []
            }"#,
            1,
        );
        let mut mgr = loader(store);

        assert_eq!(mgr.kpis().total_anual_estimado, 1000.0);
        assert_eq!(mgr.ugr_analysis().len(), 1);
        assert_eq!(mgr.monthly_consumption().len(), 1);
        assert_eq!(mgr.expiring_contracts().len(), 1);
        assert!(mgr.expired_contracts().is_empty());
        assert_eq!(mgr.all_rows().len(), 1);
    }

    #[test]
    fn test_accessors_return_independent_copies() {
        let store = MemoryStore::new(&sample_json(1000.0), 1);
        let mut mgr = loader(store);

        let mut rollups = mgr.ugr_analysis();
        rollups.clear();

        // The cache is untouched by mutations of the returned copy.
        assert_eq!(mgr.ugr_analysis().len(), 1);
    }

    // ── expiry window override ────────────────────────────────────────────────

    #[test]
    fn test_expiry_window_override_applied() {
        let json = r#"{"raw_data_for_filters": [
            {"Despesa": "Aluguel", "UGR": "CPD", "Data_Vigencia_Fim": "2025-07-15"}
        ]}"#;
        let narrow_store = MemoryStore::new(json, 1);
        let wide_store = MemoryStore::new(json, 1);

        let mut narrow = loader(narrow_store).with_expiry_window(15);
        let mut wide = loader(wide_store);

        assert_eq!(narrow.kpis().count_expiring_contracts, 0);
        assert_eq!(wide.kpis().count_expiring_contracts, 1);
    }

    // ── file store integration ────────────────────────────────────────────────

    #[test]
    fn test_file_store_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard_data.json");
        std::fs::write(&path, sample_json(1000.0)).unwrap();

        let mut mgr = DashboardLoader::new(FilePayloadStore::new(&path)).with_today(fixed_today);
        assert_eq!(mgr.kpis().total_anual_estimado, 1000.0);
    }

    #[test]
    fn test_file_store_missing_file_serves_default() {
        let mut mgr = DashboardLoader::new(FilePayloadStore::new(
            "/tmp/does-not-exist-dashboard-test-xyz.json",
        ))
        .with_today(fixed_today);

        assert_eq!(*mgr.load(), DashboardDataset::default());
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_upload_then_invalidate_picks_up_new_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard_data.json");
        std::fs::write(&path, sample_json(1000.0)).unwrap();

        let mut mgr = DashboardLoader::new(FilePayloadStore::new(&path)).with_today(fixed_today);
        assert_eq!(mgr.kpis().total_anual_estimado, 1000.0);

        // Upload a replacement payload and invalidate, as the upload
        // endpoint does; no reliance on mtime granularity.
        store_payload(&path, sample_json(5000.0).as_bytes()).unwrap();
        mgr.invalidate();

        assert_eq!(mgr.kpis().total_anual_estimado, 5000.0);
    }
}
