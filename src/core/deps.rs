//! Runtime dependency resolution
//!
//! Works out the full, pinned set of runtime dependencies of a release by
//! installing it into a throwaway virtualenv and reading back `pip freeze`.
//!
//! Resolution is best-effort: any failure yields an empty set and a warning,
//! never an error. The venv lives in a [`tempfile::TempDir`], so it is removed
//! on every exit path, including unwinding.

use super::config::SyncConfig;
use super::output;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Installer tooling that ships with every fresh venv
const BOOTSTRAP_PACKAGES: &[&str] = &["pip", "setuptools", "wheel"];

/// One runtime dependency at an exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyPin {
    pub name: String,
    pub version: String,
}

impl DependencyPin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Resolves the transitive runtime dependencies of `package==version`.
pub trait DependencyResolver {
    /// Returns the pins, or an empty list if resolution failed.
    fn resolve(&self, package: &str, version: &str) -> Vec<DependencyPin>;
}

/// Sort pins case-insensitively by name so generated blocks diff cleanly.
pub fn sort_pins(pins: &mut [DependencyPin]) {
    pins.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Compare names the way pip does (case, `-`, `_` and `.` are equivalent)
fn canonical(name: &str) -> String {
    name.to_lowercase().replace(['-', '.'], "_")
}

/// Parse `pip freeze` output into pins, dropping `package` itself and the
/// venv's bootstrap tooling.
///
/// Lines without `==` (editable installs, direct URL references, comments)
/// are ignored.
pub fn parse_freeze(freeze: &str, package: &str) -> Vec<DependencyPin> {
    let target = canonical(package);

    freeze
        .lines()
        .filter_map(|line| line.trim().split_once("=="))
        .map(|(name, version)| (name.trim(), version.trim()))
        .filter(|(name, version)| is_distribution_name(name) && !version.is_empty())
        .filter(|(name, _)| {
            let canon = canonical(name);
            canon != target && !BOOTSTRAP_PACKAGES.contains(&canon.as_str())
        })
        .map(|(name, version)| DependencyPin::new(name, version))
        .collect()
}

fn is_distribution_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Production resolver: `python -m venv`, `pip install`, `pip freeze`.
#[derive(Debug, Clone)]
pub struct VenvResolver {
    python: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl VenvResolver {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            scratch_dir: None,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            python: config.python.clone(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    /// Create venvs under `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn scratch(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("formula-sync-venv-");
        match &self.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }

    fn try_resolve(&self, package: &str, version: &str) -> Result<Vec<DependencyPin>, String> {
        let scratch = self
            .scratch()
            .map_err(|e| format!("failed to create scratch directory: {}", e))?;
        let venv = scratch.path().join("venv");

        run(
            Command::new(&self.python).arg("-m").arg("venv").arg(&venv),
            "failed to create venv",
        )?;

        let pip = pip_path(&venv);
        run(
            Command::new(&pip)
                .arg("install")
                .arg("--disable-pip-version-check")
                .arg(format!("{}=={}", package, version)),
            &format!("failed to install {}=={}", package, version),
        )?;

        let freeze = run(
            Command::new(&pip)
                .arg("freeze")
                .arg("--disable-pip-version-check"),
            "pip freeze failed",
        )?;

        // dropping `scratch` removes the venv
        Ok(parse_freeze(&freeze, package))
    }
}

impl DependencyResolver for VenvResolver {
    fn resolve(&self, package: &str, version: &str) -> Vec<DependencyPin> {
        let pb = output::spinner(&format!("resolving dependencies of {}=={}", package, version));

        match self.try_resolve(package, version) {
            Ok(pins) => {
                output::progress_done(pb);
                pins
            }
            Err(message) => {
                output::progress_fail(pb, "dependency resolution failed");
                output::warning(&message);
                Vec::new()
            }
        }
    }
}

/// Fixed answer, for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    pins: Vec<DependencyPin>,
}

impl StaticResolver {
    pub fn new(pins: Vec<DependencyPin>) -> Self {
        Self { pins }
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, _package: &str, _version: &str) -> Vec<DependencyPin> {
        self.pins.clone()
    }
}

fn pip_path(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("pip.exe")
    } else {
        venv.join("bin").join("pip")
    }
}

/// Run a command to completion and return its stdout.
fn run(cmd: &mut Command, what: &str) -> Result<String, String> {
    let out = cmd.output().map_err(|e| format!("{}: {}", what, e))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(format!("{}: {}", what, stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
