//! Shared foundation for the budget dashboard workspace.
//!
//! Holds the data model for raw and normalized budget rows, the value
//! coercion helpers that turn inconsistent spreadsheet cells into clean
//! numbers, the workspace-wide error type and the CLI settings.

pub mod coerce;
pub mod error;
pub mod models;
pub mod settings;
