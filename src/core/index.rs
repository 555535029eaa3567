//! Package index client
//!
//! Talks to the PyPI JSON API:
//!
//! - `GET <index>/<package>/json` - latest release
//! - `GET <index>/<package>/<version>/json` - one exact release
//!
//! Requests are made once with a fixed timeout. Failures are returned to
//! the caller, never retried.

use super::config::SyncConfig;
use super::error::IndexError;
use super::output;
use super::syntax::ARCHIVE_SUFFIX;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::io::Read;

/// Artifact kind of source distributions
const SDIST: &str = "sdist";

/// Release metadata document returned by the index
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    pub info: ReleaseInfo,
    #[serde(default)]
    pub urls: Vec<ArtifactDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub name: Option<String>,
    pub version: String,
}

/// One published file of a release
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactDescriptor {
    pub packagetype: String,
    pub filename: String,
    pub url: String,
    pub digests: Digests,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Digests {
    pub sha256: String,
}

/// A downloadable source artifact for one package version.
///
/// `sha256` is the index's digest of the bytes at `url`; use
/// [`IndexClient::download_sha256`] to check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub package_name: String,
    pub version: String,
    pub url: String,
    pub sha256: String,
}

impl PackageMetadata {
    /// Latest (or requested) version reported by the index
    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Pick the sdist tarball out of the published artifacts.
    pub fn source_release(&self, package: &str) -> Result<ReleaseDescriptor, IndexError> {
        self.urls
            .iter()
            .find(|a| a.packagetype == SDIST && a.filename.ends_with(ARCHIVE_SUFFIX))
            .map(|a| ReleaseDescriptor {
                package_name: package.to_string(),
                version: self.info.version.clone(),
                url: a.url.clone(),
                sha256: a.digests.sha256.clone(),
            })
            .ok_or_else(|| IndexError::NoSourceArtifact {
                package: package.to_string(),
                version: self.info.version.clone(),
            })
    }
}

/// Blocking client for the package index
#[derive(Debug, Clone)]
pub struct IndexClient {
    config: SyncConfig,
}

impl IndexClient {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Index base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.index_url
    }

    /// Fetch release metadata for the latest version, or for `version`.
    pub fn fetch_package_metadata(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> Result<PackageMetadata, IndexError> {
        let url = match version {
            Some(v) => format!("{}/{}/{}/json", self.config.index_url, package, v),
            None => format!("{}/{}/json", self.config.index_url, package),
        };

        let response = ureq::get(&url)
            .timeout(self.config.metadata_timeout)
            .set("Accept", "application/json")
            .set("User-Agent", &self.config.user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(404, _) => IndexError::NotFound {
                    package: package.to_string(),
                },
                other => IndexError::Network {
                    url: url.clone(),
                    message: failure_message(&other),
                },
            })?;

        response
            .into_json::<PackageMetadata>()
            .map_err(|e| IndexError::InvalidResponse {
                url: url.clone(),
                message: e.to_string(),
            })
    }

    /// Resolve the source artifact of the latest release, or of `version`.
    pub fn resolve_release(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> Result<ReleaseDescriptor, IndexError> {
        self.fetch_package_metadata(package, version)?
            .source_release(package)
    }

    /// Download `url` and return the hex SHA-256 of its bytes.
    pub fn download_sha256(&self, url: &str) -> Result<String, IndexError> {
        let network = |message: String| IndexError::Network {
            url: url.to_string(),
            message,
        };

        let pb = output::spinner(&format!("downloading {}", file_name(url)));

        let response = match ureq::get(url)
            .timeout(self.config.download_timeout)
            .set("User-Agent", &self.config.user_agent)
            .call()
        {
            Ok(r) => r,
            Err(e) => {
                output::progress_fail(pb, "download failed");
                return Err(network(failure_message(&e)));
            }
        };

        let mut reader = response.into_reader();
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];
        let mut total_bytes = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(n) => n,
                Err(e) => {
                    output::progress_fail(pb, "download failed");
                    return Err(network(format!("read error: {}", e)));
                }
            };
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            total_bytes += n as u64;
        }

        output::progress_success(
            pb,
            &format!("hashed {} ({} bytes)", file_name(url), total_bytes),
        );
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Describe a request failure without repeating the url, which
/// `ureq::Error`'s own display already includes.
fn failure_message(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("HTTP {} {}", code, response.status_text())
        }
        ureq::Error::Transport(transport) => match transport.message() {
            Some(message) => format!("{}: {}", transport.kind(), message),
            None => match std::error::Error::source(transport) {
                Some(source) => format!("{}: {}", transport.kind(), source),
                None => transport.kind().to_string(),
            },
        },
    }
}

fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
