//! Derivation pipeline for the budget dashboard.
//!
//! Responsible for discarding spreadsheet artifact rows, normalizing the
//! surviving line items into clean numeric records, rolling them up per
//! organizational unit and globally, and assembling the derived dataset
//! served to the presentation layer.

pub mod aggregator;
pub mod filter;
pub mod normalizer;
pub mod pipeline;

pub use dashboard_core as core;
