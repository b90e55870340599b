//! Integration tests for loading configuration from disk.

use std::io::Write;
use tempfile::NamedTempFile;
use vigil_store::{Config, StoreError};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r"
logLevel: warn
apiPort: 8181
checks:
  - name: google
    type: http
    target: https://www.google.com
    interval: 1m
    timeout: 5s
  - name: postgres
    type: tcp
    target: localhost:5432
",
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.log_level, "warn");
    assert_eq!(config.api_port, 8181);
    assert_eq!(config.checks.len(), 2);
    assert!(config.check("postgres").is_some());
}

#[test]
fn test_missing_file_is_read_error() {
    let err = Config::load("/nonexistent/vigil/config.yaml").unwrap_err();
    assert!(matches!(err, StoreError::ConfigRead { .. }));
    assert!(err.to_string().contains("/nonexistent/vigil/config.yaml"));
}

#[test]
fn test_effective_config_round_trips() {
    let file = write_config("checks:\n  - { name: db, type: tcp, target: 'localhost:5432' }\n");
    let config = Config::load(file.path()).unwrap();

    let rendered = config.to_yaml().unwrap();
    let reparsed = Config::from_yaml(&rendered).unwrap();

    assert_eq!(reparsed, config);
}
