use bytes::Bytes;
use serde_json::Value;

/// A decoded event payload
///
/// Readers hand back whatever their serializer produces, so the payload is a
/// tagged value rather than a type parameter: the serializer is chosen from
/// configuration at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    String(String),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Owned byte array
    Bytes(Vec<u8>),
    /// Shared, cheaply cloneable buffer
    Buffer(Bytes),
    Json(Value),
}

impl EventValue {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventValue::String(_) => "string",
            EventValue::Short(_) => "short",
            EventValue::Integer(_) => "integer",
            EventValue::Long(_) => "long",
            EventValue::Float(_) => "float",
            EventValue::Double(_) => "double",
            EventValue::Bytes(_) => "byte-array",
            EventValue::Buffer(_) => "byte-buffer",
            EventValue::Json(_) => "json",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes for the two binary variants
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EventValue::Bytes(b) => Some(b),
            EventValue::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue::String(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        EventValue::String(value)
    }
}

impl From<i16> for EventValue {
    fn from(value: i16) -> Self {
        EventValue::Short(value)
    }
}

impl From<i32> for EventValue {
    fn from(value: i32) -> Self {
        EventValue::Integer(value)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        EventValue::Long(value)
    }
}

impl From<f32> for EventValue {
    fn from(value: f32) -> Self {
        EventValue::Float(value)
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue::Double(value)
    }
}

impl From<Vec<u8>> for EventValue {
    fn from(value: Vec<u8>) -> Self {
        EventValue::Bytes(value)
    }
}

impl From<Bytes> for EventValue {
    fn from(value: Bytes) -> Self {
        EventValue::Buffer(value)
    }
}

impl From<Value> for EventValue {
    fn from(value: Value) -> Self {
        EventValue::Json(value)
    }
}
