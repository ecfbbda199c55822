use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::config::kafka::KafkaConfig;
use crate::config::keys::{AUTO_OFFSET_RESET_CONFIG, VALUE_DESERIALIZER_CLASS_CONFIG};
use crate::config::properties::Properties;
use crate::error::{Error, Result};
use crate::reader::{StreamReader, StreamReaderConfig};
use crate::serialization::{SerializerHandle, SerializerRegistry};
use crate::store::{StartPosition, StreamStore};

/// Consumer-side view of a Kafka property bag
///
/// Group and client ids are fixed when the config is built: configured values
/// win, otherwise fresh ids are generated so that two consumers without ids
/// never share a reader group by accident.
///
/// # Example
///
/// ```
/// use pravega_kafka_adapter::config::{ConsumerConfig, Properties};
/// use pravega_kafka_adapter::store::StartPosition;
///
/// let props = Properties::new()
///     .with("bootstrap.servers", "tcp://localhost:9090")
///     .with("pravega.scope", "orders")
///     .with("group.id", "billing")
///     .with("auto.offset.reset", "latest")
///     .with("value.deserializer", "org.apache.kafka.common.serialization.StringDeserializer");
///
/// let config = ConsumerConfig::new(props).unwrap();
/// assert_eq!(config.group_id(), "billing");
/// assert_eq!(config.start_position(), StartPosition::Latest);
///
/// let reader_config = config.reader_config(["created"]).unwrap();
/// assert_eq!(reader_config.reader_group_name, "billing");
/// ```
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    kafka: KafkaConfig,
    group_id: String,
    client_id: String,
    start_position: StartPosition,
}

impl ConsumerConfig {
    pub fn new(properties: Properties) -> Result<Self> {
        Self::from_kafka_config(KafkaConfig::new(properties)?)
    }

    pub fn with_registry(properties: Properties, registry: SerializerRegistry) -> Result<Self> {
        Self::from_kafka_config(KafkaConfig::with_registry(properties, registry)?)
    }

    pub fn from_kafka_config(kafka: KafkaConfig) -> Result<Self> {
        let group_id = kafka.resolve_group_id(&format!("readergroup-{}", Uuid::new_v4().simple()));
        let client_id = kafka.resolve_client_id(&format!("reader-{}", Uuid::new_v4().simple()));
        let start_position = parse_offset_reset(kafka.properties().get_property(AUTO_OFFSET_RESET_CONFIG))?;

        debug!(group_id = %group_id, client_id = %client_id, ?start_position, "resolved consumer config");

        Ok(Self {
            kafka,
            group_id,
            client_id,
            start_position,
        })
    }

    pub fn kafka(&self) -> &KafkaConfig {
        &self.kafka
    }

    /// Reader group name
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Reader id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn start_position(&self) -> StartPosition {
        self.start_position
    }

    /// Serializer named by `value.deserializer`
    pub fn value_deserializer(&self) -> Result<SerializerHandle> {
        self.kafka.resolve_serializer(VALUE_DESERIALIZER_CLASS_CONFIG)
    }

    /// Reader settings for the given topics, one stream per topic
    ///
    /// Fails if no scope is configured.
    pub fn reader_config<I, S>(&self, topics: I) -> Result<StreamReaderConfig>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scope = self.kafka.require_scope()?;

        let config = StreamReaderConfig::new(
            scope,
            self.kafka.resolve_server_endpoints(),
            self.group_id.as_str(),
            self.client_id.as_str(),
        )
        .with_streams(topics)
        .with_start_position(self.start_position);

        config.validate()?;
        Ok(config)
    }

    /// Build an uninitialized reader for the given topics
    pub fn create_reader<I, S>(&self, store: Arc<dyn StreamStore>, topics: I) -> Result<StreamReader>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = self.reader_config(topics)?;
        let deserializer = self.value_deserializer()?;
        StreamReader::new(store, config, deserializer)
    }
}

fn parse_offset_reset(value: Option<&str>) -> Result<StartPosition> {
    match value.map(str::trim) {
        None | Some("earliest") => Ok(StartPosition::Earliest),
        Some("latest") => Ok(StartPosition::Latest),
        Some(other) => Err(Error::ConfigurationError(format!(
            "Invalid value [{}] for property [{}]; expected earliest or latest",
            other, AUTO_OFFSET_RESET_CONFIG
        ))),
    }
}
