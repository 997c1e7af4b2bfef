//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full - batch dropped
    #[error("queue full for sink '{sink_name}', batch {seq} dropped")]
    QueueFull { sink_name: String, seq: u64 },

    /// Sink worker is gone - batch dropped
    #[error("sink '{sink_name}' worker closed, batch {seq} dropped")]
    SinkClosed { sink_name: String, seq: u64 },
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
