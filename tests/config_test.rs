//! Integration tests for configuration file resolution.

use clickhouse_mcp_server::config::{CONFIG_ENV_VAR, ClickHouseConfig};
use std::io::Write;

#[test]
fn test_explicit_path_wins() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"database": "explicit_db"}}"#).unwrap();

    let config = ClickHouseConfig::load(Some(file.path().to_path_buf())).unwrap();
    assert_eq!(config.database, "explicit_db");
}

#[test]
fn test_explicit_missing_path_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let config = ClickHouseConfig::load(Some(path)).unwrap();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 8123);
}

#[test]
fn test_explicit_malformed_path_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json at all").unwrap();

    let err = ClickHouseConfig::load(Some(file.path().to_path_buf())).unwrap_err();
    assert!(err.to_string().contains("Malformed config file"));
}

// The only test that calls load(None), so the process-wide env var
// cannot race another test.
#[test]
fn test_env_var_supplies_path_when_no_explicit_one() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"host": "env-host", "query_limit": 7}}"#).unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV_VAR, file.path());
    }
    let config = ClickHouseConfig::load(None).unwrap();
    unsafe {
        std::env::remove_var(CONFIG_ENV_VAR);
    }

    assert_eq!(config.host, "env-host");
    assert_eq!(config.query_limit, 7);
}
