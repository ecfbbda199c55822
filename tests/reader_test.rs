mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedStore, CONTROLLER_URI, SCOPE};
use futures::StreamExt;
use pravega_kafka_adapter::reader::{ReaderStatus, StreamReader, StreamReaderConfig};
use pravega_kafka_adapter::serialization::EventValue;
use pravega_kafka_adapter::store::{EventRead, ScopedStream};
use pravega_kafka_adapter::Error;

fn reader_config() -> StreamReaderConfig {
    StreamReaderConfig::new(SCOPE, CONTROLLER_URI, "test-group", "reader-1").with_stream("events")
}

fn reader_on(store: &ScriptedStore, config: StreamReaderConfig) -> StreamReader {
    StreamReader::new(Arc::new(store.clone()), config, common::string_serializer()).unwrap()
}

#[test]
fn test_construction_does_not_touch_the_store() {
    let store = ScriptedStore::new();
    let reader = reader_on(&store, reader_config());

    assert_eq!(reader.status(), ReaderStatus::Uninitialized);
    assert!(store.calls().is_empty());
}

#[test]
fn test_construction_validates_settings() {
    let store: Arc<ScriptedStore> = Arc::new(ScriptedStore::new());
    let no_streams = StreamReaderConfig::new(SCOPE, CONTROLLER_URI, "g", "r");
    let err = StreamReader::new(store.clone(), no_streams, common::string_serializer()).unwrap_err();
    assert!(matches!(err, Error::ConfigurationError(_)));

    let no_group = StreamReaderConfig::new(SCOPE, CONTROLLER_URI, "", "r").with_stream("s");
    assert!(StreamReader::new(store, no_group, common::string_serializer()).is_err());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());

    reader.initialize().await.unwrap();
    reader.initialize().await.unwrap();

    assert_eq!(reader.status(), ReaderStatus::Initialized);
    assert_eq!(
        store.calls(),
        vec!["open_manager", "create_reader_group", "create_reader"]
    );
}

#[tokio::test]
async fn test_reads_initialize_lazily_exactly_once() {
    let store = ScriptedStore::new().with_events(&["a"]);
    let mut reader = reader_on(&store, reader_config());

    assert!(!reader.is_initialized());
    reader.read_next_event().await.unwrap();
    reader.try_read_next().await.unwrap();
    let _ = reader.read_next().await;
    reader.read_all_available().await.unwrap();

    assert!(reader.is_initialized());
    assert_eq!(store.count("open_manager"), 1);
    assert_eq!(store.count("create_reader_group"), 1);
    assert_eq!(store.count("create_reader"), 1);
}

#[tokio::test]
async fn test_reader_group_disables_automatic_checkpoints() {
    let store = ScriptedStore::new();
    let config = reader_config().with_stream("audit");
    let mut reader = reader_on(&store, config);
    reader.initialize().await.unwrap();

    let group_configs = store.group_configs();
    assert_eq!(group_configs.len(), 1);
    assert!(!group_configs[0].automatic_checkpoints);
    assert_eq!(
        group_configs[0].streams,
        vec![ScopedStream::new(SCOPE, "events"), ScopedStream::new(SCOPE, "audit")]
    );
}

#[tokio::test]
async fn test_read_all_available_returns_events_in_order() {
    let store = ScriptedStore::new().with_events(&["e1", "e2", "e3"]);
    let mut reader = reader_on(&store, reader_config());

    let events = reader.read_all_available().await.unwrap();

    assert_eq!(
        events,
        vec![EventValue::from("e1"), EventValue::from("e2"), EventValue::from("e3")]
    );
    // three events plus the empty poll that ends the drain
    assert_eq!(store.count("read"), 4);
    assert!(store
        .poll_timeouts()
        .iter()
        .all(|t| *t == Duration::from_millis(1000)));
}

#[tokio::test]
async fn test_read_all_available_on_empty_stream() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());

    assert!(reader.read_all_available().await.unwrap().is_empty());
    assert_eq!(store.count("read"), 1);
}

#[tokio::test]
async fn test_drain_stops_at_checkpoint_by_default() {
    let store = ScriptedStore::new()
        .with_events(&["e1"])
        .with_read(EventRead::Checkpoint("cp".to_string()))
        .with_events(&["e2"]);
    let mut reader = reader_on(&store, reader_config());

    assert_eq!(reader.read_all_available().await.unwrap(), vec![EventValue::from("e1")]);
    assert_eq!(reader.read_all_available().await.unwrap(), vec![EventValue::from("e2")]);
}

#[tokio::test]
async fn test_drain_tolerates_configured_empty_polls() {
    let store = ScriptedStore::new()
        .with_events(&["e1"])
        .with_read(EventRead::Empty)
        .with_events(&["e2"]);
    let mut reader = reader_on(&store, reader_config().with_empty_polls_before_stop(2));

    let events = reader.read_all_available().await.unwrap();

    assert_eq!(events, vec![EventValue::from("e1"), EventValue::from("e2")]);
    // e1, empty, e2, empty, empty
    assert_eq!(store.count("read"), 5);
}

#[tokio::test]
async fn test_drain_keeps_events_read_before_a_failed_poll() {
    let store = ScriptedStore::new()
        .with_events(&["e1", "e2"])
        .with_read_failure("segment store unavailable")
        .with_events(&["e3"]);
    let mut reader = reader_on(&store, reader_config());

    let first = reader.read_all_available().await.unwrap();
    assert_eq!(first, vec![EventValue::from("e1"), EventValue::from("e2")]);

    let err = reader.read_all_available().await.unwrap_err();
    assert!(matches!(err, Error::ReadError(ref msg) if msg.contains("segment store unavailable")));

    // reported once, then reading resumes
    assert_eq!(reader.read_all_available().await.unwrap(), vec![EventValue::from("e3")]);
    assert_eq!(store.count("read"), 5);
}

#[tokio::test]
async fn test_drain_fails_when_first_poll_fails() {
    let store = ScriptedStore::new()
        .with_read_failure("boom")
        .with_events(&["e1"]);
    let mut reader = reader_on(&store, reader_config());

    assert!(matches!(reader.read_all_available().await, Err(Error::ReadError(_))));
    assert_eq!(reader.read_all_available().await.unwrap(), vec![EventValue::from("e1")]);
}

#[tokio::test]
async fn test_deferred_failure_reported_by_single_read() {
    let store = ScriptedStore::new()
        .with_events(&["e1"])
        .with_read_failure("boom")
        .with_events(&["e2"]);
    let mut reader = reader_on(&store, reader_config());

    assert_eq!(reader.read_all_available().await.unwrap(), vec![EventValue::from("e1")]);
    assert!(matches!(reader.try_read_next().await, Err(Error::ReadError(_))));
    assert_eq!(reader.try_read_next().await.unwrap(), Some(EventValue::from("e2")));
}

#[tokio::test]
async fn test_drain_with_past_deadline_does_not_poll() {
    let store = ScriptedStore::new().with_events(&["e1"]);
    let mut reader = reader_on(&store, reader_config());

    let events = reader
        .read_all_available_until(tokio::time::Instant::now())
        .await
        .unwrap();

    assert!(events.is_empty());
    assert!(reader.is_initialized());
    assert_eq!(store.count("read"), 0);
}

#[tokio::test]
async fn test_drain_polls_no_longer_than_deadline() {
    let store = ScriptedStore::new().with_events(&["e1"]);
    let mut reader = reader_on(&store, reader_config());

    let deadline = tokio::time::Instant::now() + Duration::from_millis(300);
    let events = reader.read_all_available_until(deadline).await.unwrap();

    assert_eq!(events, vec![EventValue::from("e1")]);
    assert!(store
        .poll_timeouts()
        .iter()
        .all(|t| *t <= Duration::from_millis(300)));
}

#[tokio::test]
async fn test_read_next_event_passes_outcome_through() {
    let store = ScriptedStore::new()
        .with_read(EventRead::Checkpoint("cp-1".to_string()))
        .with_events(&["e1"]);
    let mut reader = reader_on(&store, reader_config());

    assert_eq!(
        reader.read_next_event().await.unwrap(),
        EventRead::Checkpoint("cp-1".to_string())
    );
    assert_eq!(
        reader.read_next_event().await.unwrap(),
        EventRead::Event(EventValue::from("e1"))
    );
    assert_eq!(reader.read_next_event().await.unwrap(), EventRead::Empty);
    assert!(store
        .poll_timeouts()
        .iter()
        .all(|t| *t == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_try_read_next_on_empty_stream() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());

    assert_eq!(reader.try_read_next().await.unwrap(), None);
}

#[tokio::test]
async fn test_read_next_on_empty_stream_fails() {
    let store = ScriptedStore::new().with_events(&["only"]);
    let mut reader = reader_on(&store, reader_config());

    assert_eq!(reader.read_next().await.unwrap(), EventValue::from("only"));
    assert!(matches!(reader.read_next().await, Err(Error::NoEventError)));
}

#[tokio::test]
async fn test_close_releases_reader_then_manager() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());
    reader.initialize().await.unwrap();

    reader.close();

    assert_eq!(reader.status(), ReaderStatus::Closed);
    let calls = store.calls();
    assert_eq!(calls[calls.len() - 2..].to_vec(), vec!["close_reader", "close_manager"]);
}

#[tokio::test]
async fn test_close_twice_is_harmless() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());
    reader.initialize().await.unwrap();

    reader.close();
    reader.close();

    assert_eq!(store.count("close_reader"), 1);
    assert_eq!(store.count("close_manager"), 1);
}

#[tokio::test]
async fn test_failing_reader_release_still_releases_manager() {
    let store = ScriptedStore::new().failing_reader_close();
    let mut reader = reader_on(&store, reader_config());
    reader.initialize().await.unwrap();

    reader.close();
    reader.close();

    assert_eq!(store.count("close_reader"), 1);
    assert_eq!(store.count("close_manager"), 1);
    assert!(reader.is_closed());
}

#[tokio::test]
async fn test_failing_manager_release_is_swallowed() {
    let store = ScriptedStore::new().failing_reader_close().failing_manager_close();
    let mut reader = reader_on(&store, reader_config());
    reader.initialize().await.unwrap();

    reader.close();

    assert!(reader.is_closed());
}

#[test]
fn test_close_before_initialize() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());

    reader.close();

    assert!(reader.is_closed());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_reads_after_close_fail() {
    let store = ScriptedStore::new().with_events(&["e1"]);
    let mut reader = reader_on(&store, reader_config());
    reader.initialize().await.unwrap();
    reader.close();

    assert!(matches!(reader.try_read_next().await, Err(Error::ReaderClosed)));
    assert!(matches!(reader.read_all_available().await, Err(Error::ReaderClosed)));
    assert!(matches!(reader.initialize().await, Err(Error::ReaderClosed)));
    assert_eq!(store.count("open_manager"), 1);
}

#[tokio::test]
async fn test_drop_closes_reader() {
    let store = ScriptedStore::new();
    {
        let mut reader = reader_on(&store, reader_config());
        reader.initialize().await.unwrap();
    }

    assert_eq!(store.count("close_reader"), 1);
    assert_eq!(store.count("close_manager"), 1);
}

#[tokio::test]
async fn test_group_creation_failure() {
    let store = ScriptedStore::new().failing_group_creation();
    let mut reader = reader_on(&store, reader_config());

    let err = reader.read_next_event().await.unwrap_err();

    assert!(matches!(err, Error::InitializationError(_)));
    assert_eq!(reader.status(), ReaderStatus::Uninitialized);
    assert_eq!(store.count("create_reader"), 0);
    assert_eq!(store.count("close_manager"), 1);
}

#[tokio::test]
async fn test_reader_creation_failure_releases_manager() {
    let store = ScriptedStore::new().failing_reader_creation();
    let mut reader = reader_on(&store, reader_config());

    let err = reader.initialize().await.unwrap_err();

    assert!(matches!(err, Error::InitializationError(_)));
    assert!(!reader.is_initialized());
    assert_eq!(store.count("close_manager"), 1);
}

#[tokio::test]
async fn test_bad_endpoint_fails_initialization() {
    let store = ScriptedStore::new();
    let config = StreamReaderConfig::new(SCOPE, "http://nope:80", "g", "r").with_stream("s");
    let mut reader = reader_on(&store, config);

    let err = reader.initialize().await.unwrap_err();

    assert!(matches!(err, Error::InitializationError(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_events_stream() {
    let store = ScriptedStore::new()
        .with_events(&["a"])
        .with_read(EventRead::Empty)
        .with_events(&["b", "c"]);
    let mut reader = reader_on(&store, reader_config());

    let events: Vec<EventValue> = reader
        .events()
        .take(3)
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(
        events,
        vec![EventValue::from("a"), EventValue::from("b"), EventValue::from("c")]
    );
}

#[tokio::test]
async fn test_events_stream_ends_after_close_error() {
    let store = ScriptedStore::new();
    let mut reader = reader_on(&store, reader_config());
    reader.close();

    let results: Vec<_> = reader.events().collect().await;

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::ReaderClosed)));
}
