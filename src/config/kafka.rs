use tracing::debug;

use crate::config::keys::{BOOTSTRAP_SERVERS_CONFIG, CLIENT_ID_CONFIG, GROUP_ID_CONFIG};
use crate::config::properties::{Properties, PropertyValue};
use crate::config::store::StoreConfig;
use crate::error::{Error, Result};
use crate::serialization::{SerializerHandle, SerializerRegistry};

/// Resolves Kafka-style client properties into store settings
///
/// Resolution never touches the network. The only side effect is building
/// serializer instances in [`resolve_serializer`](Self::resolve_serializer).
///
/// # Example
///
/// ```
/// use pravega_kafka_adapter::config::{KafkaConfig, Properties};
/// use pravega_kafka_adapter::serialization::EventSerializer;
///
/// let props = Properties::new()
///     .with("bootstrap.servers", "tcp://broker:9090")
///     .with("pravega.controller.uri", "tcp://controller:9090")
///     .with("pravega.scope", "orders")
///     .with("value.deserializer", "org.apache.kafka.common.serialization.StringDeserializer");
///
/// let config = KafkaConfig::new(props).unwrap();
/// assert_eq!(config.resolve_server_endpoints(), "tcp://controller:9090");
/// assert_eq!(config.resolve_scope(), Some("orders"));
/// assert_eq!(config.resolve_group_id("fallback"), "fallback");
///
/// let serializer = config.resolve_serializer("value.deserializer").unwrap();
/// assert_eq!(serializer.name(), "string");
/// ```
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    properties: Properties,
    store_config: StoreConfig,
    registry: SerializerRegistry,
}

impl KafkaConfig {
    /// Create a resolver that only knows the built-in serializers
    ///
    /// Fails when `bootstrap.servers` is not set.
    pub fn new(properties: Properties) -> Result<Self> {
        Self::with_registry(properties, SerializerRegistry::new())
    }

    /// Create a resolver that can also instantiate registered serializers
    pub fn with_registry(properties: Properties, registry: SerializerRegistry) -> Result<Self> {
        if properties.get_property(BOOTSTRAP_SERVERS_CONFIG).is_none() {
            return Err(Error::ConfigurationError(format!(
                "Property [{}] is not set",
                BOOTSTRAP_SERVERS_CONFIG
            )));
        }

        let store_config = StoreConfig::from_properties(&properties);
        Ok(Self {
            properties,
            store_config,
            registry,
        })
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn store_config(&self) -> &StoreConfig {
        &self.store_config
    }

    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// Endpoint to connect to
    ///
    /// An explicit controller URI wins over `bootstrap.servers`.
    pub fn resolve_server_endpoints(&self) -> &str {
        match &self.store_config.controller_uri {
            Some(uri) => uri.as_str(),
            None => self
                .properties
                .get_property(BOOTSTRAP_SERVERS_CONFIG)
                .unwrap_or_default(),
        }
    }

    /// Configured scope, if any
    pub fn resolve_scope(&self) -> Option<&str> {
        self.store_config.scope.as_deref()
    }

    /// Configured scope, failing when it is absent
    pub fn require_scope(&self) -> Result<&str> {
        self.resolve_scope().ok_or_else(|| {
            Error::ConfigurationError(format!(
                "Property [{}] is not set",
                crate::config::keys::SCOPE_CONFIG
            ))
        })
    }

    pub fn resolve_group_id(&self, default: &str) -> String {
        self.properties.get_property_or(GROUP_ID_CONFIG, default)
    }

    pub fn resolve_client_id(&self, default: &str) -> String {
        self.properties.get_property_or(CLIENT_ID_CONFIG, default)
    }

    /// Resolve the serializer bound to `key`
    ///
    /// - a live instance is returned as is
    /// - a type reference or a string is resolved by name: Kafka built-ins map
    ///   to the store's primitive serializers, other names go through the registry
    /// - any other value shape is a configuration error
    pub fn resolve_serializer(&self, key: &str) -> Result<SerializerHandle> {
        let value = self.properties.get(key).ok_or_else(|| {
            Error::ConfigurationError(format!("No property with name [{}] found", key))
        })?;

        match value {
            PropertyValue::Serializer(serializer) => {
                debug!(key, serializer = serializer.name(), "using configured serializer instance");
                Ok(serializer.clone())
            }
            PropertyValue::Type(type_ref) => self.registry.resolve(type_ref.name()),
            PropertyValue::String(name) => self.registry.resolve(name.trim()),
            PropertyValue::Integer(_) | PropertyValue::Boolean(_) => {
                Err(Error::ConfigurationError(format!(
                    "Could not instantiate serializer from property key [{}]",
                    key
                )))
            }
        }
    }
}
