//! Common test utilities: a scratch formula directory and a mocked index.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use formula_sync::deps::{DependencyPin, StaticResolver};
use formula_sync::{FormulaSync, SyncConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A temporary `Formula/` directory.
pub struct TestEnv {
    _dir: TempDir,
    pub formula_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let formula_dir = dir.path().join("Formula");
        std::fs::create_dir_all(&formula_dir).unwrap();
        Self {
            _dir: dir,
            formula_dir,
        }
    }

    pub fn write_formula(&self, name: &str, content: &str) -> PathBuf {
        let path = self.formula_dir.join(format!("{}.rb", name));
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }
}

/// Config pointed at `server`.
pub fn config_for(server: &MockServer) -> SyncConfig {
    SyncConfig::default().with_index_url(server.uri())
}

/// Driver pointed at `server`, resolving dependencies to `pins`.
pub fn sync_for(server: &MockServer, pins: Vec<DependencyPin>) -> FormulaSync {
    sync_with_config(config_for(server), pins)
}

/// Driver built from `config`, resolving dependencies to `pins`.
pub fn sync_with_config(config: SyncConfig, pins: Vec<DependencyPin>) -> FormulaSync {
    FormulaSync::new(config).with_resolver(StaticResolver::new(pins))
}

/// Serve `GET /<package>/json` as the latest release.
pub async fn mount_latest(
    server: &MockServer,
    package: &str,
    version: &str,
    url: &str,
    sha256: &str,
) {
    let document = release_document(package, version, url, sha256);
    Mock::given(method("GET"))
        .and(path(format!("/{}/json", package)))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(server)
        .await;
}

/// Serve `GET /<package>/<version>/json`.
pub async fn mount_release(server: &MockServer, package: &str, version: &str) {
    let url = sdist_url(package, version);
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}/json", package, version)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_document(
            package,
            version,
            &url,
            &hash_of(package),
        )))
        .mount(server)
        .await;
}

/// Serve raw bytes at `route` on the mock server and return the full URL.
pub async fn mount_file(server: &MockServer, route: &str, body: &[u8]) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}
