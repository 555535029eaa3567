//! Runtime configuration
//!
//! Defaults target the public PyPI JSON API. Each setting can be overridden
//! through the environment:
//!
//! - `FORMULA_SYNC_INDEX_URL` - index base URL (default `https://pypi.org/pypi`)
//! - `FORMULA_SYNC_HTTP_TIMEOUT` - metadata timeout in seconds (clamped to 5-300)
//! - `FORMULA_SYNC_PYTHON` - interpreter used to build disposable venvs
//! - `FORMULA_SYNC_SCRATCH_DIR` - parent directory for disposable venvs

use std::path::PathBuf;
use std::time::Duration;

/// Default package index base URL
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// Timeout for metadata requests
pub const METADATA_TIMEOUT_SECS: u64 = 10;

/// Timeout for artifact downloads
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Bounds for `FORMULA_SYNC_HTTP_TIMEOUT`
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Settings shared by the index client, dependency resolver and driver.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub index_url: String,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub python: PathBuf,
    pub scratch_dir: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            metadata_timeout: Duration::from_secs(METADATA_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            python: PathBuf::from("python3"),
            scratch_dir: None,
            user_agent: format!("formula-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SyncConfig {
    /// Build a config from defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults plus overrides looked up through `var`.
    ///
    /// Unparseable timeouts are ignored; parsed ones are clamped to 5-300s.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("FORMULA_SYNC_INDEX_URL") {
            config = config.with_index_url(url);
        }
        if let Some(secs) =
            var("FORMULA_SYNC_HTTP_TIMEOUT").and_then(|s| s.trim().parse::<u64>().ok())
        {
            config = config.with_metadata_timeout(Duration::from_secs(
                secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
            ));
        }
        if let Some(python) = var("FORMULA_SYNC_PYTHON") {
            config = config.with_python(python);
        }
        if let Some(dir) = var("FORMULA_SYNC_SCRATCH_DIR") {
            config = config.with_scratch_dir(dir);
        }

        config
    }

    /// Point the client at a different index (mirrors, tests)
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Timeout applied to each metadata request
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    /// Use a different interpreter for disposable venvs
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }

    /// Create disposable venvs under `dir` instead of the system temp dir
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}
