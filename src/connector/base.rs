//! Connection settings shared by every Redis connector

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SchemaError};
use crate::key::{Importance, KeyDefinition};
use crate::materialize::ResolvedConfig;
use crate::recommender::EnumRecommender;
use crate::schema::Schema;
use crate::validator::{Pattern, Range, ValidString};
use crate::value::{Password, ValueType};

pub const HOSTS_CONF: &str = "redis.hosts";
const HOSTS_DOC: &str = "The Redis hosts to connect to, as a list of host:port entries.";

pub const CLIENT_MODE_CONF: &str = "redis.client.mode";
const CLIENT_MODE_DOC: &str = "The client mode to use when interacting with the Redis cluster.";

pub const DATABASE_CONF: &str = "redis.database";
const DATABASE_DOC: &str = "Redis database to connect to.";

pub const PASSWORD_CONF: &str = "redis.password";
const PASSWORD_DOC: &str = "Password used to connect to Redis.";

pub const SSL_CONF: &str = "redis.ssl.enabled";
const SSL_DOC: &str = "Flag to determine if SSL is enabled.";

pub const CONNECT_TIMEOUT_CONF: &str = "redis.connect.timeout.ms";
const CONNECT_TIMEOUT_DOC: &str = "The amount of time in milliseconds to wait before timing out a socket when connecting.";

pub const AUTO_RECONNECT_CONF: &str = "redis.auto.reconnect.enabled";
const AUTO_RECONNECT_DOC: &str = "Flag to determine if the Redis client should automatically reconnect.";

pub const REQUEST_QUEUE_SIZE_CONF: &str = "redis.request.queue.size";
const REQUEST_QUEUE_SIZE_DOC: &str = "The maximum number of queued requests to Redis.";

const GROUP: &str = "Connection";

/// How the client talks to Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    Standalone,
    Cluster,
}

impl ClientMode {
    pub const ALL: [ClientMode; 2] = [ClientMode::Standalone, ClientMode::Cluster];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientMode::Standalone => "Standalone",
            ClientMode::Cluster => "Cluster",
        }
    }
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientMode {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        ClientMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| SchemaError::UnsupportedValue {
                name: CLIENT_MODE_CONF.to_string(),
                detail: format!("unknown client mode '{}'", s),
            })
    }
}

/// Schema of the connection settings
pub fn connector_schema() -> Result<Schema> {
    let modes = ClientMode::ALL.map(|m| m.as_str());

    Schema::new()
        .define(
            KeyDefinition::builder(HOSTS_CONF, ValueType::List)
                .documentation(HOSTS_DOC)
                .default_value("localhost:6379")
                .validator(Pattern::new(r"[^\s,]+:\d{1,5}").map_err(|e| {
                    SchemaError::InvalidDefault {
                        name: HOSTS_CONF.to_string(),
                        reason: e.to_string(),
                    }
                })?)
                .importance(Importance::High)
                .group(GROUP)
                .order_in_group(1)
                .display_name("Hosts")
                .build()?,
        )?
        .define(
            KeyDefinition::builder(CLIENT_MODE_CONF, ValueType::String)
                .documentation(CLIENT_MODE_DOC)
                .default_value(ClientMode::Standalone.as_str())
                .validator(ValidString::one_of(modes))
                .recommender(EnumRecommender::new(modes))
                .importance(Importance::Medium)
                .group(GROUP)
                .order_in_group(2)
                .display_name("Client Mode")
                .build()?,
        )?
        .define(
            KeyDefinition::builder(DATABASE_CONF, ValueType::Int)
                .documentation(DATABASE_DOC)
                .default_value(1i32)
                .validator(Range::at_least(0i32))
                .importance(Importance::Medium)
                .group(GROUP)
                .order_in_group(3)
                .build()?,
        )?
        .define(
            KeyDefinition::builder(PASSWORD_CONF, ValueType::Password)
                .documentation(PASSWORD_DOC)
                .default_value("")
                .importance(Importance::Low)
                .group(GROUP)
                .order_in_group(4)
                .build()?,
        )?
        .define(
            KeyDefinition::builder(SSL_CONF, ValueType::Boolean)
                .documentation(SSL_DOC)
                .default_value(false)
                .importance(Importance::Medium)
                .group(GROUP)
                .order_in_group(5)
                .build()?,
        )?
        .define(
            KeyDefinition::builder(CONNECT_TIMEOUT_CONF, ValueType::Long)
                .documentation(CONNECT_TIMEOUT_DOC)
                .default_value(10000i64)
                .validator(Range::at_least(0i64))
                .importance(Importance::Low)
                .group(GROUP)
                .order_in_group(6)
                .build()?,
        )?
        .define(
            KeyDefinition::builder(AUTO_RECONNECT_CONF, ValueType::Boolean)
                .documentation(AUTO_RECONNECT_DOC)
                .default_value(true)
                .importance(Importance::Low)
                .group(GROUP)
                .order_in_group(7)
                .build()?,
        )?
        .define(
            KeyDefinition::builder(REQUEST_QUEUE_SIZE_CONF, ValueType::Int)
                .documentation(REQUEST_QUEUE_SIZE_DOC)
                .default_value(i32::MAX)
                .validator(Range::at_least(1i32))
                .importance(Importance::Low)
                .group(GROUP)
                .order_in_group(8)
                .build()?,
        )
}

/// Typed connection settings
#[derive(Debug, Clone)]
pub struct RedisConnectorConfig {
    pub hosts: Vec<String>,
    pub client_mode: ClientMode,
    pub database: i32,
    /// `None` when no password is configured
    pub password: Option<Password>,
    pub ssl_enabled: bool,
    pub connect_timeout: Duration,
    pub auto_reconnect_enabled: bool,
    pub request_queue_size: i32,
}

impl RedisConnectorConfig {
    /// Read the connection settings out of a config resolved against
    /// [`connector_schema`] or a schema extending it
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self> {
        let password = config.get_password(PASSWORD_CONF)?;
        Ok(Self {
            hosts: config.get_list(HOSTS_CONF)?.to_vec(),
            client_mode: config.get_string(CLIENT_MODE_CONF)?.parse()?,
            database: config.get_int(DATABASE_CONF)?,
            password: (!password.value().is_empty()).then(|| password.clone()),
            ssl_enabled: config.get_bool(SSL_CONF)?,
            connect_timeout: Duration::from_millis(
                config.get_long(CONNECT_TIMEOUT_CONF)?.unsigned_abs(),
            ),
            auto_reconnect_enabled: config.get_bool(AUTO_RECONNECT_CONF)?,
            request_queue_size: config.get_int(REQUEST_QUEUE_SIZE_CONF)?,
        })
    }
}
