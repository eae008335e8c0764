//! Layered Loading Tests
//!
//! Loads raw settings from config files and the environment, then validates
//! them against the sink schema.

use std::fs;
use std::time::Duration;

use redis_sink_config::connector::base::{DATABASE_CONF, HOSTS_CONF};
use redis_sink_config::connector::sink::{CHARSET_CONF, OPERATION_TIMEOUT_MS_CONF};
use redis_sink_config::{
    sink_schema, InsertOperation, RawConfig, RawValue, RedisSinkConfig, SchemaError,
};

#[test]
fn test_load_toml_file_with_nested_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sink.toml");
    fs::write(
        &path,
        r#"
[redis]
hosts = "cache-1:6379,cache-2:6379"
charset = "ISO-8859-1"
insert.operation = "PUBLISH"
operation.timeout.ms = 2500
"#,
    )
    .unwrap();

    let raw = RawConfig::load_from(Some(&path)).unwrap();
    assert_eq!(raw.get(OPERATION_TIMEOUT_MS_CONF), Some(&RawValue::Integer(2500)));

    let config = RedisSinkConfig::new(&raw).unwrap();
    assert_eq!(config.connection.hosts, vec!["cache-1:6379", "cache-2:6379"]);
    assert_eq!(config.charset.name(), "windows-1252");
    assert_eq!(config.insert_operation, InsertOperation::Publish);
    assert_eq!(config.operation_timeout, Duration::from_millis(2500));
}

#[test]
fn test_load_json_file_with_dotted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sink.json");
    fs::write(&path, r#"{"redis.charset": "UTF-16LE", "redis.hosts": ["a:1", "b:2"]}"#).unwrap();

    let raw = RawConfig::load_from(Some(&path)).unwrap();
    let config = RedisSinkConfig::new(&raw).unwrap();
    assert_eq!(config.charset.name(), "UTF-16LE");
    assert_eq!(config.connection.hosts, vec!["a:1", "b:2"]);
}

#[test]
fn test_invalid_file_reports_every_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sink.toml");
    fs::write(
        &path,
        r#"
[redis]
charset = "NOT-A-REAL-CHARSET"
insert.operation = "DELETE"
operation.timeout.ms = 50
"#,
    )
    .unwrap();

    let raw = RawConfig::load_from(Some(&path)).unwrap();
    match RedisSinkConfig::new(&raw) {
        Err(SchemaError::Invalid(errors)) => {
            assert_eq!(errors.len(), 3);
            for key in [CHARSET_CONF, "redis.insert.operation", OPERATION_TIMEOUT_MS_CONF] {
                assert!(errors.get(key).is_some(), "missing error for {}", key);
            }
        }
        other => panic!("Expected validation errors, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RawConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, SchemaError::Load(_)));
}

#[test]
fn test_tooling_validation_of_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sink.toml");
    fs::write(&path, "[redis]\nhosts = \"nohostport\"\n").unwrap();

    let raw = RawConfig::load_from(Some(&path)).unwrap();
    let values = sink_schema().unwrap().validate_for_tooling(&raw);

    let hosts = values.iter().find(|v| v.name == HOSTS_CONF).unwrap();
    assert!(hosts.value.is_none());
    assert_eq!(hosts.errors.len(), 1);

    let charset = values.iter().find(|v| v.name == CHARSET_CONF).unwrap();
    assert!(charset.errors.is_empty());
    assert!(!charset.recommended_values.is_empty());

    let database = values.iter().find(|v| v.name == DATABASE_CONF).unwrap();
    assert!(database.value.is_some());
}
