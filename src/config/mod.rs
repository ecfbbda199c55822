//! Kafka-style configuration resolution
//!
//! Turns a Kafka client property bag into the settings a stream reader needs:
//!
//! - `Properties`: the raw bag, loadable from `.properties` text or JSON
//! - `StoreConfig`: the optional `pravega.controller.uri` / `pravega.scope` block
//! - `KafkaConfig`: endpoint, scope, group id, client id and serializer resolution
//! - `ConsumerConfig`: consumer defaults and reader construction
//!
//! # Endpoint precedence
//!
//! `pravega.controller.uri` wins when present; `bootstrap.servers` is the
//! fallback and is mandatory either way.

pub mod consumer;
pub mod kafka;
pub mod keys;
pub mod properties;
pub mod store;

pub use consumer::ConsumerConfig;
pub use kafka::KafkaConfig;
pub use properties::{Properties, PropertyValue, TypeRef};
pub use store::StoreConfig;
