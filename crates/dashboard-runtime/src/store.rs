//! Backing-store access for the dashboard payload document.
//!
//! The loader never touches the filesystem directly; it goes through
//! [`PayloadStore`] so tests can simulate modification-time changes and read
//! failures without real file I/O.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::DashboardPayload;

// ── PayloadStore ──────────────────────────────────────────────────────────────

/// Read access to the source payload document.
pub trait PayloadStore {
    /// Identity of the current source content, normally the file's
    /// last-modified timestamp. `None` when the source is unavailable.
    fn fingerprint(&self) -> Option<SystemTime>;

    /// Read and parse the payload document.
    fn read_payload(&self) -> Result<DashboardPayload>;
}

// ── FilePayloadStore ──────────────────────────────────────────────────────────

/// Payload store backed by a JSON file on disk.
pub struct FilePayloadStore {
    path: PathBuf,
}

impl FilePayloadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PayloadStore for FilePayloadStore {
    fn fingerprint(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }

    fn read_payload(&self) -> Result<DashboardPayload> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| DashboardError::FileRead {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── Upload ────────────────────────────────────────────────────────────────────

/// Atomically replace the payload file with new content.
///
/// Writes to a temporary sibling first and renames it over the target, so a
/// concurrent reader sees either the old or the new document, never a
/// partial one. The caller invalidates the loader afterwards so the next
/// query re-derives from the replacement.
pub fn store_payload(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "payload file replaced");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
