//! Environment Loading Tests
//!
//! Kept in their own test binary: they set process environment variables,
//! which would leak into any loader running on a sibling test thread.

use std::fs;

use redis_sink_config::{RawConfig, RawValue, RedisSinkConfig};

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sink.toml");
    fs::write(&path, "[redis]\ndatabase = 2\ncharset = \"UTF-8\"\n").unwrap();

    std::env::set_var("REDIS_SINK__REDIS__DATABASE", "7");
    let raw = RawConfig::load_from(Some(&path));
    std::env::remove_var("REDIS_SINK__REDIS__DATABASE");

    let raw = raw.unwrap();
    assert_eq!(raw.get("redis.charset"), Some(&RawValue::from("UTF-8")));

    let config = RedisSinkConfig::new(&raw).unwrap();
    assert_eq!(config.connection.database, 7);
}
