/// In-Memory Drain Example
///
/// Configures a consumer from Kafka-style properties, writes a few events to an
/// in-memory stream store, then drains them through a reader group.
///
/// Optional settings, read from the environment or a .env file:
///    ADAPTER_SCOPE=orders
///    ADAPTER_STREAM=created
///    RUST_LOG=pravega_kafka_adapter=debug
///
/// Run: cargo run --example drain_in_memory

use std::env;
use std::sync::Arc;

use pravega_kafka_adapter::config::{ConsumerConfig, Properties};
use pravega_kafka_adapter::serialization::{EventValue, PrimitiveKind, PrimitiveSerializer};
use pravega_kafka_adapter::store::{EventRead, InMemoryStreamStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let scope = env::var("ADAPTER_SCOPE").unwrap_or_else(|_| "orders".to_string());
    let stream = env::var("ADAPTER_STREAM").unwrap_or_else(|_| "created".to_string());

    println!("=== Kafka Properties over an In-Memory Stream Store ===\n");
    println!("  Scope: {}", scope);
    println!("  Stream: {}\n", stream);

    let store = InMemoryStreamStore::new();
    store.create_scope(&scope);
    store.create_stream(&scope, &stream)?;

    let serializer = PrimitiveSerializer::new(PrimitiveKind::String);
    for i in 1..=5 {
        store.write_event(&scope, &stream, &serializer, &EventValue::from(format!("order-{}", i)))?;
    }
    println!("Wrote 5 events\n");

    let props = Properties::new()
        .with("bootstrap.servers", "tcp://localhost:9090")
        .with("pravega.scope", scope.as_str())
        .with("group.id", "billing")
        .with("client.id", "billing-1")
        .with(
            "value.deserializer",
            "org.apache.kafka.common.serialization.StringDeserializer",
        );

    let config = ConsumerConfig::new(props)?;
    let mut reader = config.create_reader(Arc::new(store.clone()), [stream.as_str()])?;

    let events = reader.read_all_available().await?;
    println!("Drained {} events:", events.len());
    for event in &events {
        println!("  {:?}", event);
    }

    store.write_event(&scope, &stream, &serializer, &EventValue::from("order-6"))?;
    store.initiate_checkpoint(&scope, config.group_id(), "cp-1")?;

    println!("\nPolling one at a time:");
    loop {
        match reader.read_next_event().await? {
            EventRead::Event(value) => println!("  event {:?}", value),
            EventRead::Checkpoint(name) => println!("  checkpoint {}", name),
            EventRead::Empty => break,
        }
    }

    reader.close();
    println!("\nStore stats: {:?}", store.stats());
    Ok(())
}
