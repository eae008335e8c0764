//! Redis Sink Configuration
//!
//! A declarative configuration schema and validation engine for the Redis sink
//! connector. Raw key/value settings are checked against a schema and turned
//! into an immutable, typed config that the connector and its tasks share.
//!
//! ## Features
//!
//! - **Schema Composition**: Derived schemas extend a base schema; redefining a key is an error
//! - **Typed Keys**: Each key declares a type, documentation, default, validator and importance
//! - **Aggregated Errors**: Every invalid key is reported in one pass
//! - **Introspection**: Serializable key descriptors and a schema fingerprint for tooling
//! - **Layered Loading**: Raw settings from config files and `REDIS_SINK__*` environment variables
//!
//! ## Flow
//!
//! ```text
//! RawConfig ──▶ materialize(schema) ──▶ ResolvedConfig ──▶ RedisSinkConfig
//!                      │
//!                      └──▶ ValidationErrors (every failing key)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use redis_sink_config::{RawConfig, RedisSinkConfig};
//!
//! let raw = RawConfig::new()
//!     .with("redis.hosts", "cache-1:6379")
//!     .with("redis.insert.operation", "PUBLISH");
//! let config = RedisSinkConfig::new(&raw)?;
//! println!("{} with {}", config.insert_operation, config.charset);
//! # Ok::<(), redis_sink_config::SchemaError>(())
//! ```

pub mod charset;
pub mod checksum;
pub mod connector;
pub mod error;
pub mod key;
pub mod materialize;
pub mod raw;
pub mod recommender;
pub mod schema;
pub mod validator;
pub mod value;

pub use charset::Charset;
pub use checksum::Checksum;
pub use connector::{connector_schema, sink_schema, InsertOperation, RedisSinkConfig};
pub use error::{ErrorKind, KeyError, Result, SchemaError, ValidationErrors};
pub use key::{Importance, KeyDefinition};
pub use materialize::{materialize, ResolvedConfig};
pub use raw::RawConfig;
pub use schema::{ConfigValue, KeyDescriptor, Schema};
pub use value::{Password, RawValue, TypedValue, ValueType};
