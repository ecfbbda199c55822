use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::StartPosition;

/// Poll timeout used while draining
pub const DEFAULT_DRAIN_POLL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Poll timeout used by single reads
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Tunables for a [`StreamReader`](super::StreamReader)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// How long each poll of a drain may wait
    pub drain_poll_timeout: Duration,

    /// How long a single read may wait
    pub poll_timeout: Duration,

    /// Consecutive polls without an event that end a drain
    ///
    /// `1` stops at the first empty poll. Larger values ride out short
    /// delays in the store at the cost of one extra timeout per drain.
    pub empty_polls_before_stop: u32,

    /// Where a newly created reader group starts
    pub start_position: StartPosition,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            drain_poll_timeout: DEFAULT_DRAIN_POLL_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            empty_polls_before_stop: 1,
            start_position: StartPosition::Earliest,
        }
    }
}

/// Everything needed to bring one reader online
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pravega_kafka_adapter::reader::StreamReaderConfig;
///
/// let config = StreamReaderConfig::new("orders", "tcp://localhost:9090", "billing", "billing-1")
///     .with_stream("created")
///     .with_stream("cancelled")
///     .with_poll_timeout(Duration::from_millis(50));
///
/// assert_eq!(config.streams, vec!["created", "cancelled"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReaderConfig {
    pub scope: String,

    /// Stream names within the scope; duplicates are ignored
    pub streams: Vec<String>,

    pub controller_uri: String,
    pub reader_group_name: String,
    pub reader_id: String,
    pub options: ReaderOptions,
}

impl StreamReaderConfig {
    pub fn new(
        scope: impl Into<String>,
        controller_uri: impl Into<String>,
        reader_group_name: impl Into<String>,
        reader_id: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            streams: Vec::new(),
            controller_uri: controller_uri.into(),
            reader_group_name: reader_group_name.into(),
            reader_id: reader_id.into(),
            options: ReaderOptions::default(),
        }
    }

    /// Add a stream (builder pattern)
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        let stream = stream.into();
        if !self.streams.contains(&stream) {
            self.streams.push(stream);
        }
        self
    }

    /// Add several streams (builder pattern)
    pub fn with_streams<I, S>(self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        streams.into_iter().fold(self, |config, s| config.with_stream(s))
    }

    /// Replace all options (builder pattern)
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the drain poll timeout (builder pattern)
    pub fn with_drain_poll_timeout(mut self, timeout: Duration) -> Self {
        self.options.drain_poll_timeout = timeout;
        self
    }

    /// Set the single-read poll timeout (builder pattern)
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.options.poll_timeout = timeout;
        self
    }

    /// Set the drain stop rule (builder pattern)
    pub fn with_empty_polls_before_stop(mut self, polls: u32) -> Self {
        self.options.empty_polls_before_stop = polls;
        self
    }

    /// Set the start position (builder pattern)
    pub fn with_start_position(mut self, start_position: StartPosition) -> Self {
        self.options.start_position = start_position;
        self
    }

    /// Check that every mandatory field is present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("scope", &self.scope),
            ("controller URI", &self.controller_uri),
            ("reader group name", &self.reader_group_name),
            ("reader id", &self.reader_id),
        ];
        for (what, value) in required {
            if value.trim().is_empty() {
                return Err(Error::ConfigurationError(format!("Reader {} must not be empty", what)));
            }
        }

        if self.streams.is_empty() {
            return Err(Error::ConfigurationError(
                "Reader needs at least one stream".to_string(),
            ));
        }
        if self.streams.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::ConfigurationError(
                "Reader stream names must not be empty".to_string(),
            ));
        }
        if self.options.empty_polls_before_stop == 0 {
            return Err(Error::ConfigurationError(
                "empty_polls_before_stop must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
