//! Error types for the adapter

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by configuration resolution and the stream reader
#[derive(Debug, Error)]
pub enum Error {
    /// Missing mandatory property, unresolvable serializer, missing scope
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Backing-store connection, scope or reader group setup failed,
    /// or a registered serializer factory could not build its instance
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// A strict read found nothing available
    #[error("No event available")]
    NoEventError,

    /// Polling the backing store failed
    #[error("Read error: {0}")]
    ReadError(String),

    /// Encoding or decoding an event failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The reader was used after it was closed
    #[error("Reader is closed")]
    ReaderClosed,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(format!("I/O error: {}", err))
    }
}
