//! Sink connector settings
//!
//! Extends the connection schema with the keys the sink needs to write
//! records: an operation timeout, the charset used for string keys and values,
//! and the write operation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::charset::Charset;
use crate::connector::base::{connector_schema, RedisConnectorConfig};
use crate::error::{Result, SchemaError};
use crate::key::{Importance, KeyDefinition};
use crate::materialize::{materialize, ResolvedConfig};
use crate::raw::RawConfig;
use crate::recommender::CharsetRecommender;
use crate::schema::Schema;
use crate::validator::{Range, ValidCharset, ValidString};
use crate::value::ValueType;

pub const OPERATION_TIMEOUT_MS_CONF: &str = "redis.operation.timeout.ms";
const OPERATION_TIMEOUT_MS_DOC: &str =
    "The amount of time in milliseconds before an operation is marked as timed out.";

pub const CHARSET_CONF: &str = "redis.charset";
const CHARSET_DOC: &str = "The character set to use for String key and values.";

pub const INSERT_OPERATION_CONF: &str = "redis.insert.operation";
const INSERT_OPERATION_DOC: &str = "The operation to use for key and values.";

/// Smallest accepted operation timeout, in milliseconds
pub const MIN_OPERATION_TIMEOUT_MS: i64 = 100;

const GROUP: &str = "Sink";

/// How records are written to Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertOperation {
    /// Store the value under the record key
    #[default]
    Set,
    /// Publish the value on a channel named by the record key
    Publish,
}

impl InsertOperation {
    pub const ALL: [InsertOperation; 2] = [InsertOperation::Set, InsertOperation::Publish];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsertOperation::Set => "SET",
            InsertOperation::Publish => "PUBLISH",
        }
    }
}

impl fmt::Display for InsertOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsertOperation {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        InsertOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| SchemaError::UnsupportedValue {
                name: INSERT_OPERATION_CONF.to_string(),
                detail: format!("unknown insert operation '{}'", s),
            })
    }
}

/// Schema of the sink connector: the connection schema plus sink keys
pub fn sink_schema() -> Result<Schema> {
    let operations = InsertOperation::ALL.map(|op| op.as_str());

    Schema::extend(
        &connector_schema()?,
        [
            KeyDefinition::builder(OPERATION_TIMEOUT_MS_CONF, ValueType::Long)
                .documentation(OPERATION_TIMEOUT_MS_DOC)
                .default_value(10000i64)
                .validator(Range::at_least(MIN_OPERATION_TIMEOUT_MS))
                .importance(Importance::Medium)
                .group(GROUP)
                .order_in_group(1)
                .build()?,
            KeyDefinition::builder(CHARSET_CONF, ValueType::String)
                .documentation(CHARSET_DOC)
                .default_value("UTF-8")
                .validator(ValidCharset)
                .recommender(CharsetRecommender)
                .importance(Importance::Low)
                .group(GROUP)
                .order_in_group(2)
                .build()?,
            KeyDefinition::builder(INSERT_OPERATION_CONF, ValueType::String)
                .documentation(INSERT_OPERATION_DOC)
                .default_value(InsertOperation::Set.as_str())
                .validator(ValidString::one_of(operations))
                .importance(Importance::Medium)
                .group(GROUP)
                .order_in_group(3)
                .build()?,
        ],
    )
}

/// Validated settings of one sink connector instance.
///
/// Built once per connector or task start; a new raw config means a new
/// `RedisSinkConfig`.
#[derive(Debug, Clone)]
pub struct RedisSinkConfig {
    pub connection: RedisConnectorConfig,
    pub operation_timeout: Duration,
    pub charset: Charset,
    pub insert_operation: InsertOperation,
    resolved: ResolvedConfig,
}

impl RedisSinkConfig {
    /// Validate a raw config and build the sink settings.
    ///
    /// Fails with [`SchemaError::Invalid`] listing every bad key.
    pub fn new(raw: &RawConfig) -> Result<Self> {
        let schema = sink_schema()?;
        let resolved = materialize(&schema, raw)?;
        let config = Self::from_resolved(resolved)?;
        config.resolved.log_values("RedisSinkConnectorConfig");
        Ok(config)
    }

    fn from_resolved(resolved: ResolvedConfig) -> Result<Self> {
        let charset_name = resolved.get_string(CHARSET_CONF)?;
        let charset =
            Charset::for_name(charset_name).ok_or_else(|| SchemaError::UnsupportedValue {
                name: CHARSET_CONF.to_string(),
                detail: format!("unknown charset '{}'", charset_name),
            })?;

        Ok(Self {
            connection: RedisConnectorConfig::from_resolved(&resolved)?,
            operation_timeout: Duration::from_millis(
                resolved.get_long(OPERATION_TIMEOUT_MS_CONF)?.unsigned_abs(),
            ),
            charset,
            insert_operation: resolved.get_string(INSERT_OPERATION_CONF)?.parse()?,
            resolved,
        })
    }

    /// The underlying resolved values, for generic access and logging
    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }
}
