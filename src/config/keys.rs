//! Property keys recognized by the adapter
//!
//! The Kafka keys keep their client names so existing configuration files
//! work unchanged.

/// Kafka broker list; mandatory, doubles as the store endpoint
pub const BOOTSTRAP_SERVERS_CONFIG: &str = "bootstrap.servers";
pub const GROUP_ID_CONFIG: &str = "group.id";
pub const CLIENT_ID_CONFIG: &str = "client.id";
pub const KEY_SERIALIZER_CLASS_CONFIG: &str = "key.serializer";
pub const VALUE_SERIALIZER_CLASS_CONFIG: &str = "value.serializer";
pub const KEY_DESERIALIZER_CLASS_CONFIG: &str = "key.deserializer";
pub const VALUE_DESERIALIZER_CLASS_CONFIG: &str = "value.deserializer";
pub const AUTO_OFFSET_RESET_CONFIG: &str = "auto.offset.reset";

/// Explicit controller URI; overrides `bootstrap.servers`
pub const CONTROLLER_URI_CONFIG: &str = "pravega.controller.uri";
/// Scope that streams and reader groups live under
pub const SCOPE_CONFIG: &str = "pravega.scope";
