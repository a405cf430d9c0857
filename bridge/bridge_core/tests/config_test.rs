//! Integration tests for configuration loading.

use std::fs;

use bridge_core::{BridgeConfig, ConfigError, LogLevel};
use tempfile::NamedTempFile;

#[test]
fn test_load_config_file() {
    let file = NamedTempFile::new().unwrap();

    let config_toml = r#"
        [runtime]
        program_name = "hostDll"

        [kernel]
        concurrency = 2
        min_chunk_len = 16
        thread_name_prefix = "test-worker"
        collect_stats = false

        [logging]
        level = "debug"
    "#;
    fs::write(file.path(), config_toml).unwrap();

    let config = BridgeConfig::from_file(file.path()).unwrap();

    assert_eq!(config.runtime.program_name, "hostDll");
    assert_eq!(config.kernel.concurrency, Some(2));
    assert_eq!(config.kernel.min_chunk_len, 16);
    assert_eq!(config.kernel.thread_name_prefix, "test-worker");
    assert!(!config.kernel.collect_stats);
    assert_eq!(config.logging.level, LogLevel::Debug);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = BridgeConfig::load(Some(&missing)).unwrap();
    assert_eq!(config.runtime, BridgeConfig::default().runtime);
    assert_eq!(config.kernel.min_chunk_len, 4096);
}

#[test]
fn test_load_rejects_invalid_values() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "[kernel]\nmin_chunk_len = 0\n").unwrap();

    let err = BridgeConfig::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_empty_file_is_default() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "").unwrap();

    let config = BridgeConfig::from_file(file.path()).unwrap();
    assert_eq!(config, BridgeConfig::default());
}
