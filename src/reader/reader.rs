use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use futures::stream::Stream;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::reader::options::StreamReaderConfig;
use crate::serialization::{EventValue, SerializerHandle};
use crate::store::{
    ClientConfig, EventRead, EventStreamReader, ReaderConfig, ReaderGroupConfig, ReaderGroupManager,
    ScopedStream, StoreError, StreamStore,
};

/// Lifecycle of a [`StreamReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStatus {
    Uninitialized,
    Initialized,
    Closed,
}

enum ReaderState {
    Uninitialized,
    Ready {
        reader: Box<dyn EventStreamReader>,
        group_manager: Box<dyn ReaderGroupManager>,
    },
    Closed,
}

/// A single reader in a reader group, polled by the caller
///
/// The reader connects lazily: the first read (or an explicit
/// [`initialize`](Self::initialize)) creates the reader group and brings the
/// reader online. Every poll waits at most its configured timeout, and there
/// is no background task; events are only fetched when the caller asks.
///
/// All reads take `&mut self`, so one reader serves one caller at a time.
/// Use one `StreamReader` per concurrent consumer.
///
/// [`close`](Self::close) releases the reader and then the group manager.
/// Dropping an open reader closes it.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use pravega_kafka_adapter::reader::{StreamReader, StreamReaderConfig};
/// use pravega_kafka_adapter::serialization::{PrimitiveKind, PrimitiveSerializer};
/// use pravega_kafka_adapter::store::InMemoryStreamStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStreamStore::new();
///     store.create_scope("orders");
///     store.create_stream("orders", "created")?;
///
///     let config = StreamReaderConfig::new("orders", "tcp://localhost:9090", "billing", "billing-1")
///         .with_stream("created");
///     let serializer = Arc::new(PrimitiveSerializer::new(PrimitiveKind::String));
///
///     let mut reader = StreamReader::new(Arc::new(store), config, serializer)?;
///     let events = reader.read_all_available().await?;
///     println!("Drained {} events", events.len());
///
///     reader.close();
///     Ok(())
/// }
/// ```
pub struct StreamReader {
    store: Arc<dyn StreamStore>,
    config: StreamReaderConfig,
    serializer: SerializerHandle,
    state: ReaderState,
    /// Poll failure held back so a drain could return the events read before it
    deferred_error: Option<Error>,
}

impl StreamReader {
    /// Create a reader without connecting
    ///
    /// Fails if any mandatory setting is empty.
    pub fn new(
        store: Arc<dyn StreamStore>,
        config: StreamReaderConfig,
        serializer: SerializerHandle,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            config,
            serializer,
            state: ReaderState::Uninitialized,
            deferred_error: None,
        })
    }

    pub fn config(&self) -> &StreamReaderConfig {
        &self.config
    }

    pub fn status(&self) -> ReaderStatus {
        match self.state {
            ReaderState::Uninitialized => ReaderStatus::Uninitialized,
            ReaderState::Ready { .. } => ReaderStatus::Initialized,
            ReaderState::Closed => ReaderStatus::Closed,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, ReaderState::Ready { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ReaderState::Closed)
    }

    /// Create the reader group and bring the reader online
    ///
    /// Does nothing if already initialized. Failures are returned as
    /// [`Error::InitializationError`] and are not retried; calling again
    /// starts over.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.state {
            ReaderState::Ready { .. } => return Ok(()),
            ReaderState::Closed => return Err(Error::ReaderClosed),
            ReaderState::Uninitialized => {}
        }

        let (reader, group_manager) = open(&self.store, &self.config, &self.serializer).await?;
        self.state = ReaderState::Ready {
            reader,
            group_manager,
        };
        Ok(())
    }

    /// The online reader, initializing first if needed
    ///
    /// A failure deferred by an earlier drain is reported here, once.
    async fn reader(&mut self) -> Result<&mut (dyn EventStreamReader + 'static)> {
        self.initialize().await?;
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }

        match &mut self.state {
            ReaderState::Ready { reader, .. } => Ok(reader.as_mut()),
            ReaderState::Closed => Err(Error::ReaderClosed),
            ReaderState::Uninitialized => Err(Error::InitializationError(
                "reader is not initialized".to_string(),
            )),
        }
    }

    async fn poll(&mut self, timeout: Duration) -> Result<EventRead> {
        self.reader()
            .await?
            .read_next_event(timeout)
            .await
            .map_err(read_error)
    }

    /// Drain every event that is available now
    ///
    /// Polls with the drain timeout until
    /// [`empty_polls_before_stop`](super::ReaderOptions::empty_polls_before_stop)
    /// consecutive polls return no event. A checkpoint counts as a poll without
    /// an event. An empty result does not mean the streams are exhausted; call
    /// again to keep consuming.
    ///
    /// If a poll fails after events were already read, those events are
    /// returned and the failure is reported by the next read instead, since
    /// the reader group has already moved past them.
    pub async fn read_all_available(&mut self) -> Result<Vec<EventValue>> {
        self.drain(None).await
    }

    /// Like [`read_all_available`](Self::read_all_available), but gives up at `deadline`
    ///
    /// Each poll waits at most until the deadline; events read before it are returned.
    pub async fn read_all_available_until(&mut self, deadline: Instant) -> Result<Vec<EventValue>> {
        self.drain(Some(deadline)).await
    }

    async fn drain(&mut self, deadline: Option<Instant>) -> Result<Vec<EventValue>> {
        let poll_timeout = self.config.options.drain_poll_timeout;
        let stop_after = self.config.options.empty_polls_before_stop.max(1);
        let reader = self.reader().await?;

        let mut events = Vec::new();
        let mut deferred = None;
        let mut empty_polls = 0;
        while empty_polls < stop_after {
            let timeout = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break;
                    }
                    remaining.min(poll_timeout)
                }
                None => poll_timeout,
            };

            let read = match reader.read_next_event(timeout).await {
                Ok(read) => read,
                Err(e) if events.is_empty() => return Err(read_error(e)),
                Err(e) => {
                    warn!(error = %e, count = events.len(), "poll failed mid-drain; returning events read so far");
                    deferred = Some(read_error(e));
                    break;
                }
            };

            match read {
                EventRead::Event(value) => {
                    events.push(value);
                    empty_polls = 0;
                }
                EventRead::Checkpoint(name) => {
                    debug!(checkpoint = %name, "passed checkpoint while draining");
                    empty_polls += 1;
                }
                EventRead::Empty => empty_polls += 1,
            }
        }

        debug!(count = events.len(), "drained events");
        self.deferred_error = deferred;
        Ok(events)
    }

    /// Poll once and return the raw outcome
    ///
    /// Distinguishes an event, a checkpoint and a timeout.
    pub async fn read_next_event(&mut self) -> Result<EventRead> {
        let timeout = self.config.options.poll_timeout;
        self.poll(timeout).await
    }

    /// Poll once; `None` if no event arrived within the poll timeout
    pub async fn try_read_next(&mut self) -> Result<Option<EventValue>> {
        Ok(self.read_next_event().await?.into_event())
    }

    /// Poll once, failing with [`Error::NoEventError`] if nothing arrived
    pub async fn read_next(&mut self) -> Result<EventValue> {
        self.try_read_next().await?.ok_or(Error::NoEventError)
    }

    /// Events as an endless stream
    ///
    /// Polls repeatedly with the single-read timeout and yields every event.
    /// The stream ends after yielding the first error, including
    /// [`Error::ReaderClosed`].
    pub fn events(&mut self) -> impl Stream<Item = Result<EventValue>> + '_ {
        try_stream! {
            loop {
                if let Some(value) = self.try_read_next().await? {
                    yield value;
                }
            }
        }
    }

    /// Release the reader, then the group manager
    ///
    /// Release failures are logged and never stop the other release.
    /// Closing is final and closing again does nothing.
    pub fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, ReaderState::Closed);
        if let ReaderState::Ready {
            mut reader,
            mut group_manager,
        } = state
        {
            release("reader", reader.close());
            release("reader group manager", group_manager.close());
            debug!(
                scope = %self.config.scope,
                group = %self.config.reader_group_name,
                reader_id = %self.config.reader_id,
                "reader closed"
            );
        }
    }
}

impl Drop for StreamReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("config", &self.config)
            .field("serializer", &self.serializer.name())
            .field("status", &self.status())
            .finish()
    }
}

/// Create (or attach to) the reader group, then bring the reader online
///
/// The group manager is released again if the reader cannot be created.
async fn open(
    store: &Arc<dyn StreamStore>,
    config: &StreamReaderConfig,
    serializer: &SerializerHandle,
) -> Result<(Box<dyn EventStreamReader>, Box<dyn ReaderGroupManager>)> {
    let scope = config.scope.as_str();
    let group = config.reader_group_name.as_str();
    let reader_id = config.reader_id.as_str();

    debug!(scope, group, reader_id, controller = %config.controller_uri, "initializing reader");

    let client_config = ClientConfig::from_controller_uri(&config.controller_uri)
        .map_err(initialization_error)?;

    // Checkpoints are left to the caller's read cadence
    let group_config = config.streams.iter().fold(
        ReaderGroupConfig::new()
            .without_automatic_checkpoints()
            .with_start_position(config.options.start_position),
        |group_config, stream| group_config.with_stream(ScopedStream::new(scope, stream)),
    );

    let mut group_manager = store
        .reader_group_manager(scope, &client_config)
        .await
        .map_err(initialization_error)?;

    match group_manager.create_reader_group(group, &group_config).await {
        Ok(true) => info!(scope, group, streams = ?config.streams, "created reader group"),
        Ok(false) => info!(scope, group, "attached to existing reader group"),
        Err(e) => {
            release("reader group manager", group_manager.close());
            return Err(initialization_error(e));
        }
    }

    let reader = match store
        .create_reader(
            scope,
            &client_config,
            reader_id,
            group,
            Arc::clone(serializer),
            &ReaderConfig::default(),
        )
        .await
    {
        Ok(reader) => reader,
        Err(e) => {
            release("reader group manager", group_manager.close());
            return Err(initialization_error(e));
        }
    };

    Ok((reader, group_manager))
}

fn release(what: &str, result: std::result::Result<(), StoreError>) {
    if let Err(e) = result {
        warn!(error = %e, "Encountered error closing {}", what);
    }
}

fn initialization_error(err: StoreError) -> Error {
    Error::InitializationError(err.to_string())
}

fn read_error(err: StoreError) -> Error {
    Error::ReadError(err.to_string())
}
