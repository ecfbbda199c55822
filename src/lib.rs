//! Kafka consumer configuration on top of a Pravega-style stream store
//!
//! Applications written against Kafka's client properties can read from a
//! segmented stream store instead: the same property bag resolves the store
//! endpoint, scope, reader group and serializer, and a [`StreamReader`]
//! consumes through a reader group with bounded polls.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pravega_kafka_adapter::config::{ConsumerConfig, Properties};
//! use pravega_kafka_adapter::store::InMemoryStreamStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let props = Properties::load("consumer.properties")?;
//!     let config = ConsumerConfig::new(props)?;
//!
//!     let store = InMemoryStreamStore::new();
//!     let mut reader = config.create_reader(Arc::new(store), ["orders"])?;
//!
//!     for event in reader.read_all_available().await? {
//!         println!("{:?}", event);
//!     }
//!     reader.close();
//!     Ok(())
//! }
//! ```

// Configuration resolution
pub mod config;
pub mod serialization;

// Store client contract and the reader adapter
pub mod reader;
pub mod store;

pub mod error;

// Re-export main types for convenience
pub use config::{ConsumerConfig, KafkaConfig, Properties, PropertyValue, TypeRef};
pub use error::{Error, Result};
pub use reader::{ReaderOptions, ReaderStatus, StreamReader, StreamReaderConfig};
pub use serialization::{EventSerializer, EventValue, SerializerHandle, SerializerRegistry};
pub use store::{EventRead, InMemoryStreamStore, StreamStore};
