//! Runtime layer for the budget dashboard.
//!
//! Owns the single in-memory derived dataset: a payload store abstraction
//! over the backing file, a modification-time keyed loader that rebuilds the
//! dataset through the derivation pipeline, and the read-only query surface
//! consumed by the presentation layer.

pub mod loader;
pub mod store;

pub use dashboard_core as core;
pub use dashboard_data as data;
