//! Generic property bag
//!
//! Values are mostly strings, but Kafka clients also accept live serializer
//! instances and class references under the serializer keys, so a value is a
//! small tagged union.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::serialization::SerializerHandle;

/// Reference to a type by its fully-qualified path
///
/// The statically typed stand-in for passing a class object as a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: &'static str,
}

impl TypeRef {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A single property value
#[derive(Debug, Clone)]
pub enum PropertyValue {
    String(String),
    /// A live serializer instance
    Serializer(SerializerHandle),
    /// A type to be looked up by name
    Type(TypeRef),
    Integer(i64),
    Boolean(bool),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<SerializerHandle> for PropertyValue {
    fn from(value: SerializerHandle) -> Self {
        PropertyValue::Serializer(value)
    }
}

impl From<TypeRef> for PropertyValue {
    fn from(value: TypeRef) -> Self {
        PropertyValue::Type(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

/// Key-value configuration in the style of `java.util.Properties`
///
/// # Example
///
/// ```
/// use pravega_kafka_adapter::config::Properties;
///
/// let props = Properties::new()
///     .with("bootstrap.servers", "tcp://localhost:9090")
///     .with("group.id", "billing");
///
/// assert_eq!(props.get_property("group.id"), Some("billing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Set a property (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// String value of a property
    ///
    /// Non-string values are treated as absent, as `Properties.getProperty` does.
    pub fn get_property(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// String value of a property, or `default` when it is absent
    pub fn get_property_or(&self, key: &str, default: &str) -> String {
        self.get_property(key).unwrap_or(default).to_string()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse Java `.properties` text
    ///
    /// The key ends at the first `=`, `:` or whitespace; `key=value`,
    /// `key: value` and `key value` are equivalent, and a key on its own has an
    /// empty value. `#` and `!` start comment lines. Line continuations and
    /// escapes are not supported.
    pub fn parse(text: &str) -> Result<Self> {
        let mut props = Properties::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let key_end = line
                .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
                .unwrap_or(line.len());
            let key = &line[..key_end];
            if key.is_empty() {
                return Err(Error::ConfigurationError(format!(
                    "Missing key on line {}: {}",
                    index + 1,
                    line
                )));
            }

            let rest = line[key_end..].trim_start();
            let value = rest
                .strip_prefix(['=', ':'])
                .unwrap_or(rest)
                .trim();
            props.set(key, value);
        }

        Ok(props)
    }

    /// Read and parse a `.properties` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Build from a flat JSON object of string, integer and boolean values
    ///
    /// Non-integer numbers are kept as their string form.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::ConfigurationError("Properties JSON must be an object".to_string())
        })?;

        let mut props = Properties::new();
        for (key, value) in object {
            let value = match value {
                Value::String(s) => PropertyValue::String(s.clone()),
                Value::Bool(b) => PropertyValue::Boolean(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => PropertyValue::Integer(i),
                    None => PropertyValue::String(n.to_string()),
                },
                other => {
                    return Err(Error::ConfigurationError(format!(
                        "Unsupported value for property [{}]: {}",
                        key, other
                    )))
                }
            };
            props.set(key.clone(), value);
        }

        Ok(props)
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}
