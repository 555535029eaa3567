//! Error types for index lookups, formula rewrites and per-formula failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the package index client.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("package '{package}' not found on the index")]
    NotFound { package: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("no source tarball found for {package} {version}")]
    NoSourceArtifact { package: String, version: String },
}

/// A required region of the formula text could not be located.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("could not locate the primary url declaration")]
    PrimaryUrlNotFound,

    #[error("could not locate the sha256 declaration following the primary url")]
    PrimaryChecksumNotFound,

    #[error("could not locate `def install` to anchor resource blocks")]
    InstallAnchorNotFound,
}

/// Failure of a single formula. Never fatal to the batch.
#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("not a recognizable formula: {}", path.display())]
    NotRecognizable { path: PathBuf },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("sha256 verification failed: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
