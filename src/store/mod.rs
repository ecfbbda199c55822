//! Stream store client contract
//!
//! The adapter drives a segmented stream store through three handles:
//!
//! - [`StreamStore`]: the client factory, bound to a scope per call
//! - [`ReaderGroupManager`]: creates (or attaches to) named reader groups
//! - [`EventStreamReader`]: one reader inside a reader group
//!
//! Reader groups coordinate position: every event of the group's streams is
//! delivered to exactly one online reader of the group. [`memory`] provides an
//! in-process implementation.

pub mod client_config;
pub mod error;
pub mod memory;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::serialization::{EventValue, SerializerHandle};

pub use client_config::{ClientConfig, Endpoint, DEFAULT_CONTROLLER_PORT};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStreamStore, StoreStats};

/// A stream name qualified by its scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedStream {
    pub scope: String,
    pub stream: String,
}

impl ScopedStream {
    pub fn new(scope: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            stream: stream.into(),
        }
    }
}

impl fmt::Display for ScopedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.stream)
    }
}

/// Where a new reader group starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPosition {
    /// From the head of each stream
    #[default]
    Earliest,
    /// From the tail: only events written after the group is created
    Latest,
}

/// Configuration for creating a reader group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderGroupConfig {
    /// Streams the group reads, in order
    pub streams: Vec<ScopedStream>,

    /// Let the store checkpoint the group periodically
    pub automatic_checkpoints: bool,

    pub start_position: StartPosition,
}

impl ReaderGroupConfig {
    /// Create an empty configuration with automatic checkpoints enabled
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            automatic_checkpoints: true,
            start_position: StartPosition::Earliest,
        }
    }

    /// Disable automatic checkpoints (builder pattern)
    pub fn without_automatic_checkpoints(mut self) -> Self {
        self.automatic_checkpoints = false;
        self
    }

    /// Add a stream (builder pattern)
    pub fn with_stream(mut self, stream: ScopedStream) -> Self {
        self.streams.push(stream);
        self
    }

    /// Set the start position (builder pattern)
    pub fn with_start_position(mut self, start_position: StartPosition) -> Self {
        self.start_position = start_position;
        self
    }
}

impl Default for ReaderGroupConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-reader settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    /// How long a new reader waits before taking over unassigned segments
    pub initial_allocation_delay: Duration,
}

/// Outcome of a single bounded poll
#[derive(Debug, Clone, PartialEq)]
pub enum EventRead {
    /// An event was read and decoded
    Event(EventValue),
    /// The reader passed a checkpoint with this name; carries no event
    Checkpoint(String),
    /// Nothing arrived within the timeout
    Empty,
}

impl EventRead {
    pub fn event(&self) -> Option<&EventValue> {
        match self {
            EventRead::Event(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_event(self) -> Option<EventValue> {
        match self {
            EventRead::Event(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        matches!(self, EventRead::Checkpoint(_))
    }
}

/// Client factory for a stream store
#[async_trait]
pub trait StreamStore: Send + Sync {
    /// Open a reader group manager for `scope`
    async fn reader_group_manager(
        &self,
        scope: &str,
        client_config: &ClientConfig,
    ) -> StoreResult<Box<dyn ReaderGroupManager>>;

    /// Bring a reader online in an existing reader group
    async fn create_reader(
        &self,
        scope: &str,
        client_config: &ClientConfig,
        reader_id: &str,
        reader_group: &str,
        serializer: SerializerHandle,
        config: &ReaderConfig,
    ) -> StoreResult<Box<dyn EventStreamReader>>;
}

/// Creates reader groups within one scope
#[async_trait]
pub trait ReaderGroupManager: Send {
    /// Create the group, or attach to it if it already exists
    ///
    /// Returns `true` when the group was newly created.
    async fn create_reader_group(&mut self, name: &str, config: &ReaderGroupConfig) -> StoreResult<bool>;

    /// Release the manager; closing twice is not an error
    fn close(&mut self) -> StoreResult<()>;
}

/// A reader inside a reader group
#[async_trait]
pub trait EventStreamReader: Send {
    /// Wait up to `timeout` for the next event
    async fn read_next_event(&mut self, timeout: Duration) -> StoreResult<EventRead>;

    /// Take the reader offline; closing twice is not an error
    fn close(&mut self) -> StoreResult<()>;
}
