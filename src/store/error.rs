use thiserror::Error;

/// Result type for store client operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by a stream store client
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid controller URI: {0}")]
    InvalidControllerUri(String),

    #[error("Scope [{0}] does not exist")]
    ScopeNotFound(String),

    #[error("Stream [{0}] does not exist")]
    StreamNotFound(String),

    #[error("Reader group [{0}] does not exist")]
    ReaderGroupNotFound(String),

    #[error("Reader [{reader_id}] is already online in reader group [{group}]")]
    ReaderAlreadyOnline { reader_id: String, group: String },

    #[error("Handle is already closed")]
    Closed,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Anything else a store implementation needs to report
    #[error("Store failure: {0}")]
    Backend(String),
}
