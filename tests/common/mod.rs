#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pravega_kafka_adapter::serialization::{EventValue, PrimitiveKind, PrimitiveSerializer, SerializerHandle};
use pravega_kafka_adapter::store::{
    ClientConfig, EventRead, EventStreamReader, InMemoryStreamStore, ReaderConfig, ReaderGroupConfig,
    ReaderGroupManager, StoreError, StoreResult, StreamStore,
};

/// Default scope used by the test fixtures
pub const SCOPE: &str = "test-scope";

/// Controller URI accepted by every store in these tests
pub const CONTROLLER_URI: &str = "tcp://127.0.0.1:9090";

pub fn string_serializer() -> SerializerHandle {
    Arc::new(PrimitiveSerializer::new(PrimitiveKind::String))
}

/// In-memory store with one scope and the given streams already created
pub fn memory_store(streams: &[&str]) -> InMemoryStreamStore {
    let store = InMemoryStreamStore::new();
    store.create_scope(SCOPE);
    for stream in streams {
        store.create_stream(SCOPE, stream).unwrap();
    }
    store
}

/// Write string events to a stream of the in-memory store
pub fn write_strings(store: &InMemoryStreamStore, stream: &str, values: &[&str]) {
    let serializer = PrimitiveSerializer::new(PrimitiveKind::String);
    for value in values {
        store
            .write_event(SCOPE, stream, &serializer, &EventValue::from(*value))
            .unwrap();
    }
}

/// Everything a [`ScriptedStore`] and its handles were asked to do
#[derive(Debug, Default)]
pub struct CallLog {
    pub calls: Vec<String>,
    pub poll_timeouts: Vec<Duration>,
    pub group_configs: Vec<ReaderGroupConfig>,
}

/// Store double that replays scripted poll results and records every call
///
/// Polls return immediately; once the script runs out every poll is `Empty`.
#[derive(Clone, Default)]
pub struct ScriptedStore {
    script: Arc<Mutex<VecDeque<StoreResult<EventRead>>>>,
    log: Arc<Mutex<CallLog>>,
    fail_group_creation: bool,
    fail_reader_creation: bool,
    fail_reader_close: bool,
    fail_manager_close: bool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue events to be returned by successive polls
    pub fn with_events(self, values: &[&str]) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            for value in values {
                script.push_back(Ok(EventRead::Event(EventValue::from(*value))));
            }
        }
        self
    }

    /// Queue an arbitrary poll result
    pub fn with_read(self, read: EventRead) -> Self {
        self.script.lock().unwrap().push_back(Ok(read));
        self
    }

    /// Queue a poll that fails
    pub fn with_read_failure(self, reason: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(StoreError::Backend(reason.to_string())));
        self
    }

    pub fn failing_group_creation(mut self) -> Self {
        self.fail_group_creation = true;
        self
    }

    pub fn failing_reader_creation(mut self) -> Self {
        self.fail_reader_creation = true;
        self
    }

    pub fn failing_reader_close(mut self) -> Self {
        self.fail_reader_close = true;
        self
    }

    pub fn failing_manager_close(mut self) -> Self {
        self.fail_manager_close = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.log.lock().unwrap().calls.iter().filter(|c| *c == call).count()
    }

    pub fn poll_timeouts(&self) -> Vec<Duration> {
        self.log.lock().unwrap().poll_timeouts.clone()
    }

    pub fn group_configs(&self) -> Vec<ReaderGroupConfig> {
        self.log.lock().unwrap().group_configs.clone()
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().calls.push(call.to_string());
    }
}

#[async_trait]
impl StreamStore for ScriptedStore {
    async fn reader_group_manager(
        &self,
        _scope: &str,
        _client_config: &ClientConfig,
    ) -> StoreResult<Box<dyn ReaderGroupManager>> {
        self.record("open_manager");
        Ok(Box::new(ScriptedManager {
            store: self.clone(),
        }))
    }

    async fn create_reader(
        &self,
        _scope: &str,
        _client_config: &ClientConfig,
        _reader_id: &str,
        _reader_group: &str,
        _serializer: SerializerHandle,
        _config: &ReaderConfig,
    ) -> StoreResult<Box<dyn EventStreamReader>> {
        self.record("create_reader");
        if self.fail_reader_creation {
            return Err(StoreError::Backend("reader creation refused".to_string()));
        }
        Ok(Box::new(ScriptedReader {
            store: self.clone(),
        }))
    }
}

struct ScriptedManager {
    store: ScriptedStore,
}

#[async_trait]
impl ReaderGroupManager for ScriptedManager {
    async fn create_reader_group(&mut self, _name: &str, config: &ReaderGroupConfig) -> StoreResult<bool> {
        self.store.record("create_reader_group");
        self.store.log.lock().unwrap().group_configs.push(config.clone());
        if self.store.fail_group_creation {
            return Err(StoreError::ScopeNotFound("test-scope".to_string()));
        }
        Ok(true)
    }

    fn close(&mut self) -> StoreResult<()> {
        self.store.record("close_manager");
        if self.store.fail_manager_close {
            return Err(StoreError::Backend("manager close failed".to_string()));
        }
        Ok(())
    }
}

struct ScriptedReader {
    store: ScriptedStore,
}

#[async_trait]
impl EventStreamReader for ScriptedReader {
    async fn read_next_event(&mut self, timeout: Duration) -> StoreResult<EventRead> {
        self.store.record("read");
        self.store.log.lock().unwrap().poll_timeouts.push(timeout);
        self.store
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(EventRead::Empty))
    }

    fn close(&mut self) -> StoreResult<()> {
        self.store.record("close_reader");
        if self.store.fail_reader_close {
            return Err(StoreError::Backend("reader close failed".to_string()));
        }
        Ok(())
    }
}
