//! Detection tests: formula directory in, pending updates out.

mod common;

use common::*;
use formula_sync::{FormulaError, IndexError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_outdated_formula_yields_pending_update() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    let file = env.write_formula("httpie", HTTPIE_WITH_RESOURCES);

    let new_url = sdist_url("httpie", "3.2.2");
    mount_latest(&server, "httpie", "3.2.2", &new_url, &hash_of("httpie")).await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.updates.len(), 1);
    let update = &report.updates[0];
    assert_eq!(update.formula, "httpie");
    assert_eq!(update.pypi_name, "httpie");
    assert_eq!(update.current_version, "3.2.1");
    assert_eq!(update.latest_version, "3.2.2");
    assert_eq!(update.tarball_url, new_url);
    assert_eq!(update.sha256, hash_of("httpie"));
    assert_eq!(update.file_path, file);
}

#[tokio::test]
async fn test_up_to_date_formula_yields_nothing() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("rich", &simple_formula("Rich", "rich", "13.7.0", &hash_of("rich")));

    mount_latest(&server, "rich", "13.7.0", &sdist_url("rich", "13.7.0"), &hash_of("rich")).await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert!(report.updates.is_empty());
    assert_eq!(report.up_to_date, 1);
}

#[tokio::test]
async fn test_older_index_version_is_not_an_update() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("tool", &simple_formula("Tool", "tool", "2.0", "aa"));

    // A yanked 2.0 leaves 1.9.9 as the index's latest.
    mount_latest(&server, "tool", "1.9.9", &sdist_url("tool", "1.9.9"), "bb").await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert!(report.updates.is_empty());
}

#[tokio::test]
async fn test_one_missing_package_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("alpha", &simple_formula("Alpha", "alpha", "1.0", "aa"));
    env.write_formula("ghost", &simple_formula("Ghost", "ghost", "1.0", "bb"));
    env.write_formula("omega", &simple_formula("Omega", "omega", "1.0", "cc"));

    mount_latest(&server, "alpha", "1.1", &sdist_url("alpha", "1.1"), "a2").await;
    mount_latest(&server, "omega", "1.2", &sdist_url("omega", "1.2"), "c2").await;
    Mock::given(method("GET"))
        .and(path("/ghost/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    let names: Vec<&str> = report.updates.iter().map(|u| u.formula.as_str()).collect();
    assert_eq!(names, ["alpha", "omega"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].formula, "ghost");
    assert!(matches!(
        report.failures[0].error,
        FormulaError::Index(IndexError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_slow_index_times_out_without_stopping_the_batch() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("alpha", &simple_formula("Alpha", "alpha", "1.0", "aa"));
    env.write_formula("sluggish", &simple_formula("Sluggish", "sluggish", "1.0", "bb"));

    mount_latest(&server, "alpha", "1.1", &sdist_url("alpha", "1.1"), "a2").await;
    let document = release_document("sluggish", "1.1", &sdist_url("sluggish", "1.1"), "b2");
    Mock::given(method("GET"))
        .and(path("/sluggish/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(document)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_metadata_timeout(Duration::from_millis(300));
    let report = sync_with_config(config, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    let names: Vec<&str> = report.updates.iter().map(|u| u.formula.as_str()).collect();
    assert_eq!(names, ["alpha"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].formula, "sluggish");
    let FormulaError::Index(IndexError::Network { url, message }) = &report.failures[0].error else {
        panic!("expected network error, got {:?}", report.failures[0].error);
    };
    assert!(url.ends_with("/sluggish/json"));
    assert!(!message.contains(url.as_str()), "message: {}", message);
}

#[tokio::test]
async fn test_server_error_reports_status_once() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("broken", &simple_formula("Broken", "broken", "1.0", "aa"));

    Mock::given(method("GET"))
        .and(path("/broken/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    let error = &report.failures[0].error;
    let FormulaError::Index(IndexError::Network { url, message }) = error else {
        panic!("expected network error, got {:?}", error);
    };
    assert!(message.starts_with("HTTP 503"), "message: {}", message);
    assert_eq!(error.to_string().matches(url.as_str()).count(), 1);
}

#[tokio::test]
async fn test_named_formula_only() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("alpha", &simple_formula("Alpha", "alpha", "1.0", "aa"));
    env.write_formula("beta", &simple_formula("Beta", "beta", "1.0", "bb"));

    mount_latest(&server, "beta", "2.0", &sdist_url("beta", "2.0"), "b2").await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, Some("beta"))
        .unwrap();

    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].formula, "beta");
}

#[tokio::test]
async fn test_missing_directory_and_formula_are_structural_errors() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    let sync = sync_for(&server, vec![]);

    assert!(sync.check_dir(&env.formula_dir.join("nope"), None).is_err());
    assert!(sync.check_dir(&env.formula_dir, Some("ghost")).is_err());
}

#[tokio::test]
async fn test_declared_version_literal_uses_formula_name() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("toolz", GITHUB_ARCHIVE_FORMULA);

    mount_latest(&server, "toolz", "0.12.1", &sdist_url("toolz", "0.12.1"), "t2").await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].pypi_name, "toolz");
    assert_eq!(report.updates[0].current_version, "0.12.0");
}

#[tokio::test]
async fn test_underscored_sdist_name_is_normalized() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    let content = simple_formula("ZopeEvent", "zope_event", "5.0", "aa");
    env.write_formula("zope-event", &content);

    mount_latest(&server, "zope-event", "5.1", &sdist_url("zope_event", "5.1"), "z2").await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].formula, "zopeevent");
    assert_eq!(report.updates[0].pypi_name, "zope-event");
}

#[tokio::test]
async fn test_unparseable_versions_fall_back_to_inequality() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula(
        "calver",
        &simple_formula("Calver", "calver", "2024.01.15.1", "aa"),
    );

    mount_latest(
        &server,
        "calver",
        "2024.02.01.1",
        &sdist_url("calver", "2024.02.01.1"),
        "c2",
    )
    .await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].latest_version, "2024.02.01.1");
}

#[tokio::test]
async fn test_latest_without_sdist_is_item_failure() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    env.write_formula("wheelonly", &simple_formula("Wheelonly", "wheelonly", "1.0", "aa"));

    Mock::given(method("GET"))
        .and(path("/wheelonly/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": { "version": "1.1" },
            "urls": []
        })))
        .mount(&server)
        .await;

    let report = sync_for(&server, vec![])
        .check_dir(&env.formula_dir, None)
        .unwrap();

    assert!(report.updates.is_empty());
    assert!(matches!(
        report.failures[0].error,
        FormulaError::Index(IndexError::NoSourceArtifact { .. })
    ));
}
