//! Stream reader adapter
//!
//! Bridges the pull-based Kafka consumer model onto a store reader group:
//!
//! - `StreamReader`: lazily joins a reader group and polls it with bounded timeouts
//! - `StreamReaderConfig`: scope, streams, endpoint and reader identity
//! - `ReaderOptions`: poll timeouts, drain stop rule and start position
//!
//! # Reading
//!
//! 1. **Initialize**: on first use, create or attach to the reader group
//!    (automatic checkpoints disabled) and bring one reader online
//! 2. **Poll**: `read_next_event`, `try_read_next` and `read_next` poll once;
//!    `read_all_available` drains until a poll comes back empty
//! 3. **Close**: release the reader, then the group manager; failures are logged

pub mod options;
pub mod reader;

pub use options::{ReaderOptions, StreamReaderConfig, DEFAULT_DRAIN_POLL_TIMEOUT, DEFAULT_POLL_TIMEOUT};
pub use reader::{ReaderStatus, StreamReader};
