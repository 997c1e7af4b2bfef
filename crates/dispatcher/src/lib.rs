//! # Dispatcher
//!
//! Topic transport for detection batches.
//!
//! 负责：
//! - 实现 `Transport`：订阅者数量 = 存活的 sink 数量
//! - Fan-out 每个 batch 到多个 sinks
//! - 隔离慢 sink，不阻塞定时器

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, Detection3DArray, Transport};
pub use dispatcher::{create_dispatcher, create_sink_handle, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{Envelope, SinkHandle};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, NetworkSink};
