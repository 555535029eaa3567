//! Pipeline driver
//!
//! Two modes, run strictly one formula at a time:
//!
//! - **check**: extract each formula, ask the index for its latest release,
//!   compare, and collect a [`PendingUpdate`] for every formula that is behind.
//! - **apply**: take a list of pending updates and rewrite each formula,
//!   optionally regenerating its resource blocks first.
//!
//! A single formula failing never stops the batch. Per-formula failures are
//! collected into the report; only structural problems (missing directory,
//! unknown formula) are returned as errors.

use super::config::SyncConfig;
use super::deps::{self, DependencyResolver, VenvResolver};
use super::error::FormulaError;
use super::formula::{self, Extraction};
use super::fs_utils;
use super::index::IndexClient;
use super::mutate::{self, ResolvedResource};
use super::output;
use super::updates::PendingUpdate;
use super::version::{self, ComparisonMethod};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A formula that could not be processed
#[derive(Debug)]
pub struct ItemFailure {
    pub formula: String,
    pub error: FormulaError,
}

/// Outcome of a check run
#[derive(Debug, Default)]
pub struct CheckReport {
    pub updates: Vec<PendingUpdate>,
    pub up_to_date: usize,
    pub failures: Vec<ItemFailure>,
}

/// Outcome of an apply run
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Formulas whose file was rewritten (or would be, on a dry run)
    pub applied: Vec<String>,
    /// Formulas whose text was already current
    pub unchanged: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

/// What happened to one formula during apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Written,
    WouldWrite,
    Unchanged,
}

/// Knobs for apply mode
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// Regenerate resource blocks from the release's runtime dependencies
    pub resources: bool,
    /// Download the primary artifact and check its sha256 before rewriting
    pub verify: bool,
    /// Compute the new text but don't write it
    pub dry_run: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            resources: true,
            verify: false,
            dry_run: false,
        }
    }
}

/// List the formulas to process: every `*.rb` in `dir` (sorted), or just
/// `dir/<only>.rb`.
pub fn discover(dir: &Path, only: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Formula directory '{}' not found", dir.display());
    }

    if let Some(name) = only {
        let path = dir.join(format!("{}.rb", name));
        if !path.is_file() {
            anyhow::bail!("Formula '{}' not found in {}", name, dir.display());
        }
        return Ok(vec![path]);
    }

    let pattern = format!("{}/*.rb", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid formula directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Drives checks and rewrites against one index and one dependency resolver.
pub struct FormulaSync {
    client: IndexClient,
    resolver: Box<dyn DependencyResolver>,
}

impl FormulaSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            resolver: Box::new(VenvResolver::from_config(&config)),
            client: IndexClient::new(config),
        }
    }

    /// Swap the dependency resolver (tests, offline runs)
    pub fn with_resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Check every formula in `dir` (or only `only`) for newer releases.
    pub fn check_dir(&self, dir: &Path, only: Option<&str>) -> Result<CheckReport> {
        let paths = discover(dir, only)?;
        let mut report = CheckReport::default();

        output::action(&format!(
            "Checking {} formula(s) against {}",
            paths.len(),
            self.client.base_url()
        ));

        let total = paths.len();
        for (i, path) in paths.iter().enumerate() {
            let label = formula_label(path);
            output::action_numbered(i + 1, total, &format!("Checking {}", label));

            match self.check_formula(path) {
                Ok(Some(update)) => {
                    output::success(&format!(
                        "{}: {} -> {}",
                        update.formula, update.current_version, update.latest_version
                    ));
                    report.updates.push(update);
                }
                Ok(None) => report.up_to_date += 1,
                Err(error) => {
                    output::error(&format!("{}: {}", label, error));
                    report.failures.push(ItemFailure {
                        formula: label,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Check one formula file. `Ok(None)` means it is up to date.
    pub fn check_formula(&self, path: &Path) -> Result<Option<PendingUpdate>, FormulaError> {
        let content = read_formula(path)?;

        let info = match formula::classify(&content, path) {
            Extraction::UrlDerived(info) => info,
            Extraction::DeclaredLiteral(info) => {
                output::detail(&format!(
                    "{}: version taken from version literal, assuming package '{}'",
                    info.name, info.pypi_name
                ));
                info
            }
            Extraction::Unrecognized => {
                return Err(FormulaError::NotRecognizable {
                    path: path.to_path_buf(),
                });
            }
        };

        let metadata = self.client.fetch_package_metadata(&info.pypi_name, None)?;
        let latest = metadata.version();
        let comparison = version::compare(&info.version, latest);

        if comparison.method == ComparisonMethod::StringFallback {
            output::warning(&format!(
                "{}: '{}' vs '{}' compared as plain strings",
                info.name, info.version, latest
            ));
        }

        if !comparison.newer {
            output::skip(&format!("{} {} is up to date", info.name, info.version));
            return Ok(None);
        }

        let release = metadata.source_release(&info.pypi_name)?;
        Ok(Some(PendingUpdate::new(&info, release)))
    }

    /// Apply every pending update, collecting per-formula failures.
    pub fn apply_updates(&self, updates: &[PendingUpdate], options: ApplyOptions) -> ApplyReport {
        let mut report = ApplyReport::default();
        let total = updates.len();

        for (i, update) in updates.iter().enumerate() {
            output::action_numbered(
                i + 1,
                total,
                &format!("Updating {} to {}", update.formula, update.latest_version),
            );

            match self.apply_update(update, options) {
                Ok(ApplyOutcome::Written) => {
                    output::success(&format!("Updated {}", update.file_path.display()));
                    report.applied.push(update.formula.clone());
                }
                Ok(ApplyOutcome::WouldWrite) => {
                    output::info(&format!("Would update {}", update.file_path.display()));
                    report.applied.push(update.formula.clone());
                }
                Ok(ApplyOutcome::Unchanged) => {
                    output::skip(&format!("{} already current", update.formula));
                    report.unchanged.push(update.formula.clone());
                }
                Err(error) => {
                    output::error(&format!("{}: {}", update.formula, error));
                    report.failures.push(ItemFailure {
                        formula: update.formula.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Rewrite one formula. Nothing is written unless the whole rewrite
    /// succeeded and changed the text.
    pub fn apply_update(
        &self,
        update: &PendingUpdate,
        options: ApplyOptions,
    ) -> Result<ApplyOutcome, FormulaError> {
        let content = read_formula(&update.file_path)?;

        if options.verify {
            let actual = self.client.download_sha256(&update.tarball_url)?;
            if !actual.eq_ignore_ascii_case(&update.sha256) {
                return Err(FormulaError::ChecksumMismatch {
                    expected: update.sha256.clone(),
                    actual,
                });
            }
            output::detail("sha256 verified");
        }

        let resources = if options.resources {
            Some(self.resolve_resources(update))
        } else {
            None
        };

        let new_content = mutate::apply(&content, update, resources.as_deref())?;

        if new_content == content {
            return Ok(ApplyOutcome::Unchanged);
        }
        if options.dry_run {
            return Ok(ApplyOutcome::WouldWrite);
        }

        fs_utils::write_atomic(&update.file_path, &new_content).map_err(|source| {
            FormulaError::Io {
                path: update.file_path.clone(),
                source,
            }
        })?;
        Ok(ApplyOutcome::Written)
    }

    /// Resolve the release's runtime dependencies to source artifacts.
    ///
    /// Pins whose artifact can't be resolved are dropped with a warning.
    fn resolve_resources(&self, update: &PendingUpdate) -> Vec<ResolvedResource> {
        let mut pins = self
            .resolver
            .resolve(&update.pypi_name, &update.latest_version);
        deps::sort_pins(&mut pins);

        if !pins.is_empty() {
            output::sub_action(&format!("Resolving {} resource(s)", pins.len()));
        }

        pins.iter()
            .filter_map(|pin| {
                match self.client.resolve_release(&pin.name, Some(&pin.version)) {
                    Ok(release) => Some(ResolvedResource::new(pin, &release)),
                    Err(e) => {
                        output::warning(&format!(
                            "skipping resource {}=={}: {}",
                            pin.name, pin.version, e
                        ));
                        None
                    }
                }
            })
            .collect()
    }
}

fn read_formula(path: &Path) -> Result<String, FormulaError> {
    std::fs::read_to_string(path).map_err(|source| FormulaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn formula_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
