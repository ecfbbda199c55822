//! Name-based serializer lookup

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::serializer::{EventSerializer, PrimitiveKind, PrimitiveSerializer, SerializerHandle};
use crate::error::{Error, Result};

/// Package prefix of the Kafka built-in serializer classes
pub const KAFKA_SERIALIZATION_PACKAGE: &str = "org.apache.kafka.common.serialization.";

/// Type alias for serializer factories
///
/// A factory returns `Err` with a reason when it cannot build its serializer.
pub type SerializerFactory =
    Arc<dyn Fn() -> std::result::Result<SerializerHandle, String> + Send + Sync>;

/// Map a Kafka built-in serializer or deserializer class name to its primitive kind
///
/// Both spellings of a name map to the same kind.
///
/// ```
/// use pravega_kafka_adapter::serialization::{builtin_kind, PrimitiveKind};
///
/// assert_eq!(
///     builtin_kind("org.apache.kafka.common.serialization.LongDeserializer"),
///     Some(PrimitiveKind::Long)
/// );
/// assert_eq!(builtin_kind("com.example.CustomSerializer"), None);
/// ```
pub fn builtin_kind(class_name: &str) -> Option<PrimitiveKind> {
    let simple = class_name.strip_prefix(KAFKA_SERIALIZATION_PACKAGE)?;
    let stem = simple
        .strip_suffix("Deserializer")
        .or_else(|| simple.strip_suffix("Serializer"))?;

    match stem {
        "String" => Some(PrimitiveKind::String),
        "Integer" => Some(PrimitiveKind::Integer),
        "Float" => Some(PrimitiveKind::Float),
        "Long" => Some(PrimitiveKind::Long),
        "Double" => Some(PrimitiveKind::Double),
        "Short" => Some(PrimitiveKind::Short),
        "ByteArray" => Some(PrimitiveKind::ByteArray),
        "ByteBuffer" => Some(PrimitiveKind::ByteBuffer),
        _ => None,
    }
}

/// Registry of serializers that can be named in configuration
///
/// Kafka's built-in class names are always recognized and substituted with
/// [`PrimitiveSerializer`]s. Any other name must be registered here before
/// configuration is resolved.
///
/// # Example
///
/// ```
/// use pravega_kafka_adapter::serialization::{JsonSerializer, SerializerRegistry};
///
/// let mut registry = SerializerRegistry::new();
/// registry.register_type::<JsonSerializer>();
/// registry.register("com.example.OrderSerializer", || Ok(std::sync::Arc::new(JsonSerializer)));
///
/// assert!(registry.contains("com.example.OrderSerializer"));
/// ```
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    factories: HashMap<String, SerializerFactory>,
}

impl SerializerRegistry {
    /// Create a registry that only knows the built-ins
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under a fully-qualified name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> std::result::Result<SerializerHandle, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a serializer type under its Rust type path
    ///
    /// A [`TypeRef::of::<S>()`](crate::config::TypeRef::of) property value
    /// resolves to a fresh `S::default()`.
    pub fn register_type<S>(&mut self)
    where
        S: EventSerializer + Default + 'static,
    {
        self.register(std::any::type_name::<S>(), || {
            Ok(Arc::new(S::default()) as SerializerHandle)
        });
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> std::result::Result<SerializerHandle, String> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        builtin_kind(name).is_some() || self.factories.contains_key(name)
    }

    /// Resolve a fully-qualified name to a live serializer
    ///
    /// Unknown names are a configuration mistake; a factory that fails is an
    /// initialization problem.
    pub fn resolve(&self, name: &str) -> Result<SerializerHandle> {
        if let Some(kind) = builtin_kind(name) {
            debug!(class = name, kind = kind.as_str(), "substituting built-in serializer");
            return Ok(Arc::new(PrimitiveSerializer::new(kind)));
        }

        let factory = self.factories.get(name).ok_or_else(|| {
            Error::ConfigurationError(format!("Serializer type [{}] is not registered", name))
        })?;

        debug!(class = name, "instantiating registered serializer");
        factory().map_err(|reason| {
            Error::InitializationError(format!(
                "Could not instantiate serializer [{}]: {}",
                name, reason
            ))
        })
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("SerializerRegistry")
            .field("registered", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::JsonSerializer;

    #[test]
    fn test_both_spellings_map_to_same_kind() {
        for stem in ["String", "Integer", "Float", "Long", "Double", "Short", "ByteArray", "ByteBuffer"] {
            let ser = builtin_kind(&format!("{}{}Serializer", KAFKA_SERIALIZATION_PACKAGE, stem));
            let de = builtin_kind(&format!("{}{}Deserializer", KAFKA_SERIALIZATION_PACKAGE, stem));
            assert!(ser.is_some(), "{} serializer not recognized", stem);
            assert_eq!(ser, de);
        }
    }

    #[test]
    fn test_short_maps_to_short() {
        assert_eq!(
            builtin_kind("org.apache.kafka.common.serialization.ShortSerializer"),
            Some(PrimitiveKind::Short)
        );
    }

    #[test]
    fn test_non_kafka_names_are_not_builtin() {
        assert_eq!(builtin_kind("StringSerializer"), None);
        assert_eq!(builtin_kind("org.apache.kafka.common.serialization.UUIDSerializer"), None);
        assert_eq!(builtin_kind("org.apache.kafka.common.serialization.String"), None);
    }

    #[test]
    fn test_unregistered_name_is_configuration_error() {
        let registry = SerializerRegistry::new();
        let err = registry.resolve("com.example.Missing").unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_failing_factory_is_initialization_error() {
        let registry = SerializerRegistry::new()
            .with("com.example.Broken", || Err("constructor panicked".to_string()));
        let err = registry.resolve("com.example.Broken").unwrap_err();
        assert!(matches!(err, Error::InitializationError(_)));
        assert!(err.to_string().contains("constructor panicked"));
    }

    #[test]
    fn test_register_type_uses_type_path() {
        let mut registry = SerializerRegistry::new();
        registry.register_type::<JsonSerializer>();
        let serializer = registry
            .resolve(std::any::type_name::<JsonSerializer>())
            .unwrap();
        assert_eq!(serializer.name(), "json");
    }

    #[test]
    fn test_builtins_win_over_registrations() {
        let registry = SerializerRegistry::new().with(
            "org.apache.kafka.common.serialization.StringSerializer",
            || Ok(Arc::new(JsonSerializer) as SerializerHandle),
        );
        let serializer = registry
            .resolve("org.apache.kafka.common.serialization.StringSerializer")
            .unwrap();
        assert_eq!(serializer.name(), "string");
    }
}
