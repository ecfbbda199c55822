//! Serializer contract and the serializers shipped with the crate

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::value::EventValue;
use crate::error::{Error, Result};

/// Converts events to and from the bytes stored in a stream
///
/// The backing store does not distinguish serializers from deserializers, so
/// one implementation covers both directions.
pub trait EventSerializer: Send + Sync + fmt::Debug {
    /// Identifies the serializer; two handles with the same name encode identically
    fn name(&self) -> &str;

    fn serialize(&self, value: &EventValue) -> Result<Bytes>;

    fn deserialize(&self, bytes: &[u8]) -> Result<EventValue>;
}

/// Shared handle to a live serializer
pub type SerializerHandle = Arc<dyn EventSerializer>;

/// The primitive types with a built-in serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Short,
    Integer,
    Long,
    Float,
    Double,
    ByteArray,
    ByteBuffer,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::String,
        PrimitiveKind::Short,
        PrimitiveKind::Integer,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::ByteArray,
        PrimitiveKind::ByteBuffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::ByteArray => "byte-array",
            PrimitiveKind::ByteBuffer => "byte-buffer",
        }
    }
}

/// Built-in serializer for one primitive kind
///
/// Numbers are big-endian and strings UTF-8, the same bytes the Kafka
/// serializers of the same name produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveSerializer {
    kind: PrimitiveKind,
}

impl PrimitiveSerializer {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn mismatch(&self, value: &EventValue) -> Error {
        Error::SerializationError(format!(
            "{} serializer cannot encode a {} value",
            self.kind.as_str(),
            value.kind_name()
        ))
    }

    fn fixed<const N: usize>(&self, bytes: &[u8]) -> Result<[u8; N]> {
        bytes.try_into().map_err(|_| {
            Error::SerializationError(format!(
                "{} payload must be {} bytes, got {}",
                self.kind.as_str(),
                N,
                bytes.len()
            ))
        })
    }
}

impl EventSerializer for PrimitiveSerializer {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn serialize(&self, value: &EventValue) -> Result<Bytes> {
        let bytes = match (self.kind, value) {
            (PrimitiveKind::String, EventValue::String(s)) => Bytes::copy_from_slice(s.as_bytes()),
            (PrimitiveKind::Short, EventValue::Short(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (PrimitiveKind::Integer, EventValue::Integer(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (PrimitiveKind::Long, EventValue::Long(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (PrimitiveKind::Float, EventValue::Float(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (PrimitiveKind::Double, EventValue::Double(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (PrimitiveKind::ByteArray | PrimitiveKind::ByteBuffer, EventValue::Bytes(b)) => {
                Bytes::copy_from_slice(b)
            }
            (PrimitiveKind::ByteArray | PrimitiveKind::ByteBuffer, EventValue::Buffer(b)) => b.clone(),
            _ => return Err(self.mismatch(value)),
        };
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<EventValue> {
        let value = match self.kind {
            PrimitiveKind::String => {
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    Error::SerializationError(format!("Invalid UTF-8 string payload: {}", e))
                })?;
                EventValue::String(s.to_string())
            }
            PrimitiveKind::Short => EventValue::Short(i16::from_be_bytes(self.fixed(bytes)?)),
            PrimitiveKind::Integer => EventValue::Integer(i32::from_be_bytes(self.fixed(bytes)?)),
            PrimitiveKind::Long => EventValue::Long(i64::from_be_bytes(self.fixed(bytes)?)),
            PrimitiveKind::Float => EventValue::Float(f32::from_be_bytes(self.fixed(bytes)?)),
            PrimitiveKind::Double => EventValue::Double(f64::from_be_bytes(self.fixed(bytes)?)),
            PrimitiveKind::ByteArray => EventValue::Bytes(bytes.to_vec()),
            PrimitiveKind::ByteBuffer => EventValue::Buffer(Bytes::copy_from_slice(bytes)),
        };
        Ok(value)
    }
}

/// JSON documents, for payloads outside the primitive set
///
/// Not one of the built-ins: register it with a
/// [`SerializerRegistry`](super::SerializerRegistry) to make it resolvable by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl EventSerializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, value: &EventValue) -> Result<Bytes> {
        match value {
            EventValue::Json(v) => Ok(Bytes::from(serde_json::to_vec(v)?)),
            other => Err(Error::SerializationError(format!(
                "json serializer cannot encode a {} value",
                other.kind_name()
            ))),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<EventValue> {
        Ok(EventValue::Json(serde_json::from_slice(bytes)?))
    }
}
