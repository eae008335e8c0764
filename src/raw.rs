//! Raw configuration input
//!
//! A [`RawConfig`] is the untyped key/value map handed over by the hosting
//! framework. It can be built directly, converted from JSON, or loaded from
//! layered sources:
//! - Config file (redis-sink.toml) in default locations and the XDG config dir
//! - An explicit config file (TOML or JSON)
//! - Environment variables (REDIS_SINK__*)
//!
//! ## Example config file (redis-sink.toml):
//! ```toml
//! [redis]
//! hosts = "cache-1:6379,cache-2:6379"
//! charset = "UTF-8"
//! insert.operation = "PUBLISH"
//! operation.timeout.ms = 2500
//! ```
//!
//! Nested tables are flattened into dotted key names, so the file above yields
//! `redis.hosts`, `redis.charset`, `redis.insert.operation` and
//! `redis.operation.timeout.ms`. The environment variable
//! `REDIS_SINK__REDIS__OPERATION__TIMEOUT__MS=2500` sets the same key.

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SchemaError};
use crate::value::RawValue;

/// Environment variable prefix for layered loading
pub const ENV_PREFIX: &str = "REDIS_SINK";

const CONFIG_LOCATIONS: [&str; 3] = [
    "redis-sink.toml",
    ".redis-sink.toml",
    "config/redis-sink.toml",
];

/// Untyped configuration supplied at connector or task start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig {
    values: BTreeMap<String, RawValue>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace one entry
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Convert a JSON object; nested objects are flattened into dotted names
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(SchemaError::UnsupportedValue {
                name: "<root>".to_string(),
                detail: "configuration must be an object".to_string(),
            });
        };

        let mut values = BTreeMap::new();
        for (key, child) in map {
            flatten(key, child, &mut values)?;
        }
        Ok(Self { values })
    }

    /// Load from default locations and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from default locations, an optional explicit file, and the environment.
    ///
    /// Later sources override earlier ones. An explicit file must exist.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        for location in CONFIG_LOCATIONS {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "redis-sink") {
            let xdg_config = config_dir.config_dir().join("redis-sink.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let tree: serde_json::Value = config.try_deserialize()?;
        let raw = Self::from_json(&tree)?;
        tracing::debug!(keys = raw.len(), "loaded raw configuration");
        Ok(raw)
    }

    /// Get the raw value for a key
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flatten(
    name: &str,
    value: &serde_json::Value,
    out: &mut BTreeMap<String, RawValue>,
) -> Result<()> {
    if let serde_json::Value::Object(map) = value {
        for (key, child) in map {
            flatten(&format!("{}.{}", name, key), child, out)?;
        }
        return Ok(());
    }

    let raw = RawValue::from_json(value).ok_or_else(|| SchemaError::UnsupportedValue {
        name: name.to_string(),
        detail: "lists of objects are not supported".to_string(),
    })?;
    out.insert(name.to_string(), raw);
    Ok(())
}
