//! Redis connector settings built on the schema engine

pub mod base;
pub mod sink;

pub use base::{connector_schema, ClientMode, RedisConnectorConfig};
pub use sink::{sink_schema, InsertOperation, RedisSinkConfig};
