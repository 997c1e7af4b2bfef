//! Sink implementations
//!
//! Contains LogSink, FileSink, and NetworkSink.

mod file;
mod log;
mod network;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};

use contracts::Detection3DArray;
use serde::Serialize;

/// Serialized form of a batch as written by the file and network sinks
#[derive(Debug, Serialize)]
pub(crate) struct PublishedBatch<'a> {
    pub seq: u64,
    pub batch: &'a Detection3DArray,
}
