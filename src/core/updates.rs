//! Pending-update exchange format
//!
//! `check` and `apply` can run as separate invocations; the JSON list written
//! here is the only thing passed between them:
//!
//! ```json
//! [
//!   {
//!     "formula": "httpie",
//!     "pypi_name": "httpie",
//!     "current_version": "3.2.1",
//!     "latest_version": "3.2.2",
//!     "tarball_url": "https://files.pythonhosted.org/packages/.../httpie-3.2.2.tar.gz",
//!     "sha256": "...",
//!     "file_path": "Formula/httpie.rb"
//!   }
//! ]
//! ```

use super::formula::FormulaInfo;
use super::fs_utils;
use super::index::ReleaseDescriptor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A formula whose upstream has a newer release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub formula: String,
    pub pypi_name: String,
    pub current_version: String,
    pub latest_version: String,
    pub tarball_url: String,
    pub sha256: String,
    pub file_path: PathBuf,
}

impl PendingUpdate {
    pub fn new(info: &FormulaInfo, release: ReleaseDescriptor) -> Self {
        Self {
            formula: info.name.clone(),
            pypi_name: info.pypi_name.clone(),
            current_version: info.version.clone(),
            latest_version: release.version,
            tarball_url: release.url,
            sha256: release.sha256,
            file_path: info.file_path.clone(),
        }
    }
}

/// Serialize updates as pretty JSON (two-space indent)
pub fn to_json(updates: &[PendingUpdate]) -> Result<String> {
    serde_json::to_string_pretty(updates).context("Failed to serialize updates")
}

/// Write updates to `path`
pub fn write_updates(path: &Path, updates: &[PendingUpdate]) -> Result<()> {
    let json = to_json(updates)?;
    fs_utils::write_atomic(path, &json)
        .with_context(|| format!("Failed to write updates file: {}", path.display()))
}

/// Read updates from `path`
pub fn read_updates(path: &Path) -> Result<Vec<PendingUpdate>> {
    if !path.exists() {
        anyhow::bail!("Updates file '{}' not found", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read updates file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid updates file: {}", path.display()))
}
