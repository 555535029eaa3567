//! Formula extraction
//!
//! Reads just enough of a formula to know which PyPI package it tracks and
//! at which version. Two strategies are tried in order:
//!
//! 1. [`Extraction::UrlDerived`]: the primary url follows the sdist naming
//!    convention `<name>-<version>.tar.gz`, so both come from the filename.
//! 2. [`Extraction::DeclaredLiteral`]: the url is something else (GitHub
//!    archive, mirror), so the formula's own name is used as the package
//!    name and the version comes from a `version "..."` literal.
//!
//! Anything else is [`Extraction::Unrecognized`]; callers log and skip it.

use super::syntax::{self, ARCHIVE_SUFFIX};
use std::path::{Path, PathBuf};

/// Snapshot of one formula, taken at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaInfo {
    /// Formula name (class identifier, lower-cased)
    pub name: String,
    /// Version the formula currently declares
    pub version: String,
    /// Package name on the index
    pub pypi_name: String,
    pub file_path: PathBuf,
}

/// Result of running both extraction strategies over a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    UrlDerived(FormulaInfo),
    DeclaredLiteral(FormulaInfo),
    Unrecognized,
}

impl Extraction {
    /// Collapse to the extracted info, if any
    pub fn into_info(self) -> Option<FormulaInfo> {
        match self {
            Self::UrlDerived(info) | Self::DeclaredLiteral(info) => Some(info),
            Self::Unrecognized => None,
        }
    }
}

/// Extract a [`FormulaInfo`] from formula text.
///
/// Returns `None` when the text is not a recognizable formula.
pub fn extract(content: &str, file_path: &Path) -> Option<FormulaInfo> {
    classify(content, file_path).into_info()
}

/// Run the extraction strategies and report which one matched.
pub fn classify(content: &str, file_path: &Path) -> Extraction {
    let Some(class_name) = content.lines().find_map(syntax::class_declaration) else {
        return Extraction::Unrecognized;
    };
    let name = class_name.to_lowercase();

    let Some(primary) = syntax::find_primary_url(content.lines(), |_| true) else {
        return Extraction::Unrecognized;
    };

    if let Some((pypi_name, version)) = split_sdist_url(primary.quoted.value) {
        return Extraction::UrlDerived(FormulaInfo {
            name,
            version,
            pypi_name,
            file_path: file_path.to_path_buf(),
        });
    }

    match declared_version(content) {
        Some(version) => Extraction::DeclaredLiteral(FormulaInfo {
            pypi_name: name.clone(),
            name,
            version: version.to_string(),
            file_path: file_path.to_path_buf(),
        }),
        None => Extraction::Unrecognized,
    }
}

/// Split `.../<name>-<version>.tar.gz` into a normalized package name and
/// version.
///
/// The split point is the right-most `-` after which a valid version
/// follows, so `python-dateutil-2.8.2.tar.gz` yields `python-dateutil`.
pub fn split_sdist_url(url: &str) -> Option<(String, String)> {
    let filename = url.rsplit('/').next()?;
    let stem = filename.strip_suffix(ARCHIVE_SUFFIX)?;

    for (dash, _) in stem.rmatch_indices('-') {
        let (name, version) = (&stem[..dash], &stem[dash + 1..]);
        if is_package_name(name) && is_version(version) {
            return Some((normalize_name(name), version.to_string()));
        }
    }
    None
}

/// Normalize a package name the way resource blocks spell it
pub fn normalize_name(name: &str) -> String {
    name.replace('_', "-").to_lowercase()
}

/// First `version "..."` literal in the formula
fn declared_version(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| syntax::quoted_value(line, "version"))
        .map(|q| q.value)
}

fn is_package_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// One to four dot-separated alphanumeric components, the first numeric.
fn is_version(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return false;
    }
    let alnum = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric());
    parts.iter().all(alnum) && parts[0].chars().all(|c| c.is_ascii_digit())
}
