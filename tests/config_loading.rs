//! Integration tests for config loading across all file formats.

use std::io::Write;

use ceno_proxy::config::model::Config;
use ceno_proxy::config::sources::parse_config_str;
use ceno_proxy::config::validation::validate;
use ceno_proxy::config::{self, is_missing};
use ceno_proxy::error::ProxyError;

fn load_demo(name: &str) -> String {
    let path = format!("demo/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

fn demo_config() -> Config {
    let config = parse_config_str("json", &load_demo("ceno.json"), "ceno.json").unwrap();
    validate(&config).unwrap();
    config
}

#[test]
fn json_demo_loads_and_validates() {
    let config = demo_config();
    assert_eq!(config.port, 3090);
    assert_eq!(config.create_path, "/create");
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_demo_matches_json() {
    let config = parse_config_str("yaml", &load_demo("ceno.yaml"), "ceno.yaml").unwrap();
    assert_eq!(config, demo_config());
}

#[cfg(feature = "toml")]
#[test]
fn toml_demo_matches_json() {
    let config = parse_config_str("toml", &load_demo("ceno.toml"), "ceno.toml").unwrap();
    assert_eq!(config, demo_config());
}

#[tokio::test]
async fn missing_file_counts_as_no_config() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load(&dir.path().join("ceno.json")).await.unwrap_err();
    assert!(matches!(err, ProxyError::ConfigFileNotFound { .. }));
    assert!(is_missing(&err));
}

#[tokio::test]
async fn file_is_loaded_and_validated() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"cache_service": "http://127.0.0.1:4000", "request_service": "http://127.0.0.1:4001", "timeout": 250}}"#
    )
    .unwrap();

    let config = config::load(file.path()).await.unwrap();
    assert_eq!(config.timeout, 250);
    assert_eq!(config.cache_service, "http://127.0.0.1:4000");
}

#[tokio::test]
async fn invalid_file_is_not_missing() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"cache_service": "localhost:4000", "request_service": "http://127.0.0.1:4001"}}"#
    )
    .unwrap();

    let err = config::load(file.path()).await.unwrap_err();
    let ProxyError::ConfigValidation { ref errors } = err else {
        panic!("expected validation errors, got {err}");
    };
    assert_eq!(errors[0].field, "cache_service");
    assert!(!is_missing(&err));
}

#[tokio::test]
async fn explicit_path_wins_over_candidates() {
    let path = std::path::Path::new("/nonexistent/custom.json");
    assert_eq!(
        config::resolve_path(Some(path)).await.as_deref(),
        Some(path)
    );
}
