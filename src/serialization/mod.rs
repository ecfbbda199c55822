//! Event serialization
//!
//! Kafka clients name their serializers by class. This module keeps that
//! convention working: the eight Kafka built-ins resolve to the store's
//! [`PrimitiveSerializer`]s, and anything else is looked up in a
//! [`SerializerRegistry`] of factories registered by the application.

pub mod registry;
pub mod serializer;
pub mod value;

pub use registry::{builtin_kind, SerializerFactory, SerializerRegistry, KAFKA_SERIALIZATION_PACKAGE};
pub use serializer::{EventSerializer, JsonSerializer, PrimitiveKind, PrimitiveSerializer, SerializerHandle};
pub use value::EventValue;
