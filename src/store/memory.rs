//! In-process stream store
//!
//! Implements the full reader-group contract over in-memory streams. Useful
//! for tests and for running the adapter without a store cluster.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::serialization::{EventSerializer, EventValue, SerializerHandle};
use crate::store::{
    ClientConfig, EventRead, EventStreamReader, ReaderConfig, ReaderGroupConfig, ReaderGroupManager,
    ScopedStream, StartPosition, StoreError, StoreResult, StreamStore,
};

/// Counts of handles opened and closed against an [`InMemoryStreamStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub group_managers_opened: usize,
    pub group_managers_closed: usize,
    pub reader_groups_created: usize,
    pub readers_opened: usize,
    pub readers_closed: usize,
}

#[derive(Default)]
struct Counters {
    group_managers_opened: AtomicUsize,
    group_managers_closed: AtomicUsize,
    reader_groups_created: AtomicUsize,
    readers_opened: AtomicUsize,
    readers_closed: AtomicUsize,
}

#[derive(Default)]
struct StoreState {
    scopes: HashMap<String, ScopeState>,
}

#[derive(Default)]
struct ScopeState {
    streams: HashMap<String, Vec<Bytes>>,
    groups: HashMap<String, GroupState>,
}

struct GroupState {
    config: ReaderGroupConfig,
    /// Next unread index per stream, shared by every reader in the group
    cursors: Vec<(ScopedStream, usize)>,
    /// Online readers and the checkpoints each has yet to pass
    online: HashMap<String, VecDeque<String>>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<StoreState>,
    appended: Notify,
    counters: Counters,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stream store kept entirely in memory
///
/// Cloning is cheap; clones share the same streams and reader groups.
///
/// # Example
///
/// ```
/// use pravega_kafka_adapter::serialization::{PrimitiveKind, PrimitiveSerializer};
/// use pravega_kafka_adapter::store::InMemoryStreamStore;
///
/// let store = InMemoryStreamStore::new();
/// store.create_scope("orders");
/// store.create_stream("orders", "created").unwrap();
///
/// let serializer = PrimitiveSerializer::new(PrimitiveKind::String);
/// store.write_event("orders", "created", &serializer, &"order-1".into()).unwrap();
/// assert_eq!(store.stream_len("orders", "created"), Some(1));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStreamStore {
    shared: Arc<Shared>,
}

impl InMemoryStreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope; returns `false` if it already existed
    pub fn create_scope(&self, scope: &str) -> bool {
        let mut state = self.shared.lock();
        if state.scopes.contains_key(scope) {
            return false;
        }
        state.scopes.insert(scope.to_string(), ScopeState::default());
        true
    }

    /// Create a stream in an existing scope; returns `false` if it already existed
    pub fn create_stream(&self, scope: &str, stream: &str) -> StoreResult<bool> {
        let mut state = self.shared.lock();
        let scope_state = state
            .scopes
            .get_mut(scope)
            .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))?;

        if scope_state.streams.contains_key(stream) {
            return Ok(false);
        }
        scope_state.streams.insert(stream.to_string(), Vec::new());
        Ok(true)
    }

    /// Append already-serialized bytes to a stream
    pub fn append(&self, scope: &str, stream: &str, payload: Bytes) -> StoreResult<()> {
        {
            let mut state = self.shared.lock();
            let events = state
                .scopes
                .get_mut(scope)
                .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))?
                .streams
                .get_mut(stream)
                .ok_or_else(|| StoreError::StreamNotFound(ScopedStream::new(scope, stream).to_string()))?;
            events.push(payload);
        }
        self.shared.appended.notify_waiters();
        Ok(())
    }

    /// Serialize an event and append it to a stream
    pub fn write_event(
        &self,
        scope: &str,
        stream: &str,
        serializer: &dyn EventSerializer,
        value: &EventValue,
    ) -> StoreResult<()> {
        let payload = serializer
            .serialize(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.append(scope, stream, payload)
    }

    /// Number of events ever written to a stream
    pub fn stream_len(&self, scope: &str, stream: &str) -> Option<usize> {
        let state = self.shared.lock();
        state
            .scopes
            .get(scope)
            .and_then(|s| s.streams.get(stream))
            .map(Vec::len)
    }

    /// Configuration a reader group was created with
    pub fn reader_group_config(&self, scope: &str, group: &str) -> Option<ReaderGroupConfig> {
        let state = self.shared.lock();
        state
            .scopes
            .get(scope)
            .and_then(|s| s.groups.get(group))
            .map(|g| g.config.clone())
    }

    /// Ids of the readers currently online in a group, sorted
    pub fn online_readers(&self, scope: &str, group: &str) -> Vec<String> {
        let state = self.shared.lock();
        let mut readers: Vec<String> = state
            .scopes
            .get(scope)
            .and_then(|s| s.groups.get(group))
            .map(|g| g.online.keys().cloned().collect())
            .unwrap_or_default();
        readers.sort();
        readers
    }

    /// Queue a named checkpoint for every online reader of a group
    ///
    /// Returns the number of readers that will observe it.
    pub fn initiate_checkpoint(&self, scope: &str, group: &str, name: &str) -> StoreResult<usize> {
        let notified = {
            let mut state = self.shared.lock();
            let group_state = state
                .scopes
                .get_mut(scope)
                .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))?
                .groups
                .get_mut(group)
                .ok_or_else(|| StoreError::ReaderGroupNotFound(group.to_string()))?;

            for pending in group_state.online.values_mut() {
                pending.push_back(name.to_string());
            }
            group_state.online.len()
        };
        self.shared.appended.notify_waiters();
        Ok(notified)
    }

    pub fn stats(&self) -> StoreStats {
        let c = &self.shared.counters;
        StoreStats {
            group_managers_opened: c.group_managers_opened.load(Ordering::SeqCst),
            group_managers_closed: c.group_managers_closed.load(Ordering::SeqCst),
            reader_groups_created: c.reader_groups_created.load(Ordering::SeqCst),
            readers_opened: c.readers_opened.load(Ordering::SeqCst),
            readers_closed: c.readers_closed.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl StreamStore for InMemoryStreamStore {
    async fn reader_group_manager(
        &self,
        scope: &str,
        _client_config: &ClientConfig,
    ) -> StoreResult<Box<dyn ReaderGroupManager>> {
        self.shared
            .counters
            .group_managers_opened
            .fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryGroupManager {
            shared: Arc::clone(&self.shared),
            scope: scope.to_string(),
            closed: false,
        }))
    }

    async fn create_reader(
        &self,
        scope: &str,
        _client_config: &ClientConfig,
        reader_id: &str,
        reader_group: &str,
        serializer: SerializerHandle,
        _config: &ReaderConfig,
    ) -> StoreResult<Box<dyn EventStreamReader>> {
        {
            let mut state = self.shared.lock();
            let group = state
                .scopes
                .get_mut(scope)
                .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))?
                .groups
                .get_mut(reader_group)
                .ok_or_else(|| StoreError::ReaderGroupNotFound(reader_group.to_string()))?;

            if group.online.contains_key(reader_id) {
                return Err(StoreError::ReaderAlreadyOnline {
                    reader_id: reader_id.to_string(),
                    group: reader_group.to_string(),
                });
            }
            group.online.insert(reader_id.to_string(), VecDeque::new());
        }

        self.shared.counters.readers_opened.fetch_add(1, Ordering::SeqCst);
        debug!(scope, reader_group, reader_id, "reader online");

        Ok(Box::new(MemoryReader {
            shared: Arc::clone(&self.shared),
            scope: scope.to_string(),
            group: reader_group.to_string(),
            reader_id: reader_id.to_string(),
            serializer,
            closed: false,
        }))
    }
}

struct MemoryGroupManager {
    shared: Arc<Shared>,
    scope: String,
    closed: bool,
}

#[async_trait]
impl ReaderGroupManager for MemoryGroupManager {
    async fn create_reader_group(&mut self, name: &str, config: &ReaderGroupConfig) -> StoreResult<bool> {
        if self.closed {
            return Err(StoreError::Closed);
        }

        let mut state = self.shared.lock();
        if !state.scopes.contains_key(&self.scope) {
            return Err(StoreError::ScopeNotFound(self.scope.clone()));
        }

        let mut cursors = Vec::with_capacity(config.streams.len());
        for stream in &config.streams {
            let len = state
                .scopes
                .get(&stream.scope)
                .and_then(|s| s.streams.get(&stream.stream))
                .map(Vec::len)
                .ok_or_else(|| StoreError::StreamNotFound(stream.to_string()))?;

            let start = match config.start_position {
                StartPosition::Earliest => 0,
                StartPosition::Latest => len,
            };
            cursors.push((stream.clone(), start));
        }

        let groups = match state.scopes.get_mut(&self.scope) {
            Some(scope_state) => &mut scope_state.groups,
            None => return Err(StoreError::ScopeNotFound(self.scope.clone())),
        };
        if groups.contains_key(name) {
            return Ok(false);
        }

        groups.insert(
            name.to_string(),
            GroupState {
                config: config.clone(),
                cursors,
                online: HashMap::new(),
            },
        );
        self.shared
            .counters
            .reader_groups_created
            .fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.closed {
            self.closed = true;
            self.shared
                .counters
                .group_managers_closed
                .fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MemoryReader {
    shared: Arc<Shared>,
    scope: String,
    group: String,
    reader_id: String,
    serializer: SerializerHandle,
    closed: bool,
}

enum Next {
    Checkpoint(String),
    Payload(Bytes),
}

impl MemoryReader {
    /// Take the next checkpoint or event without waiting
    fn take_next(&self) -> StoreResult<Option<Next>> {
        let mut state = self.shared.lock();

        let group = state
            .scopes
            .get_mut(&self.scope)
            .and_then(|s| s.groups.get_mut(&self.group))
            .ok_or_else(|| StoreError::ReaderGroupNotFound(self.group.clone()))?;
        if let Some(name) = group
            .online
            .get_mut(&self.reader_id)
            .and_then(VecDeque::pop_front)
        {
            return Ok(Some(Next::Checkpoint(name)));
        }
        let cursors = group.cursors.clone();

        // Streams are drained in configured order; per-stream order is preserved
        let found = cursors.iter().enumerate().find_map(|(index, (stream, cursor))| {
            state
                .scopes
                .get(&stream.scope)
                .and_then(|s| s.streams.get(&stream.stream))
                .and_then(|events| events.get(*cursor))
                .map(|payload| (index, payload.clone()))
        });

        let Some((index, payload)) = found else {
            return Ok(None);
        };

        if let Some(group) = state
            .scopes
            .get_mut(&self.scope)
            .and_then(|s| s.groups.get_mut(&self.group))
        {
            group.cursors[index].1 += 1;
        }
        Ok(Some(Next::Payload(payload)))
    }
}

#[async_trait]
impl EventStreamReader for MemoryReader {
    async fn read_next_event(&mut self, timeout: Duration) -> StoreResult<EventRead> {
        if self.closed {
            return Err(StoreError::Closed);
        }

        // No deadline when the timeout is too large to represent
        let deadline = Instant::now().checked_add(timeout);
        loop {
            // Registered before checking so an append in between still wakes us
            let appended = self.shared.appended.notified();

            match self.take_next()? {
                Some(Next::Checkpoint(name)) => return Ok(EventRead::Checkpoint(name)),
                Some(Next::Payload(payload)) => {
                    let value = self
                        .serializer
                        .deserialize(&payload)
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                    return Ok(EventRead::Event(value));
                }
                None => {}
            }

            match deadline {
                Some(deadline) => {
                    if time::timeout_at(deadline, appended).await.is_err() {
                        return Ok(EventRead::Empty);
                    }
                }
                None => appended.await,
            }
        }
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut state = self.shared.lock();
        if let Some(group) = state
            .scopes
            .get_mut(&self.scope)
            .and_then(|s| s.groups.get_mut(&self.group))
        {
            group.online.remove(&self.reader_id);
        }
        self.shared.counters.readers_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
