//! Dispatcher - topic-side fan-out to sinks
//!
//! The dispatcher is the publish end of a topic: every attached sink is
//! one subscriber with its own bounded queue and worker task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, instrument, trace};

use contracts::{Detection3DArray, SinkConfig, SinkType, Transport};

use crate::error::DispatcherError;
use crate::handle::{Envelope, SinkHandle};
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Topic the sinks subscribe to
    pub topic: String,
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Build the dispatcher and start one worker per sink
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(topic = %self.config.topic))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config).await?;
        info!(
            topic = %self.config.topic,
            sinks = handles.len(),
            "Dispatcher ready"
        );
        Ok(Dispatcher::with_handles(self.config.topic, handles))
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    async fn initialize_handles(
        config: &DispatcherConfig,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            match create_sink_handle(sink_config).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Workers already spawned must not outlive a failed build.
                    for handle in handles {
                        handle.shutdown().await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            debug!(sink = %config.name, path = %sink.path().display(), "File sink opened");
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Publishes batches on one topic to every attached sink
pub struct Dispatcher {
    topic: String,
    handles: Vec<SinkHandle>,
    /// Sequence number assigned to the next published batch
    next_seq: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles
    pub fn with_handles(topic: impl Into<String>, handles: Vec<SinkHandle>) -> Self {
        Self {
            topic: topic.into(),
            handles,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Number of batches published so far
    pub fn published_count(&self) -> u64 {
        self.next_seq.load(Ordering::Relaxed)
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Stop accepting batches and wait for every sink to drain and close
    ///
    /// Returns the final metrics of each sink.
    #[instrument(name = "dispatcher_shutdown", skip(self), fields(topic = %self.topic))]
    pub async fn shutdown(self) -> Vec<(String, MetricsSnapshot)> {
        let published = self.published_count();
        let mut final_metrics = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let name = handle.name().to_string();
            let metrics = Arc::clone(handle.metrics());
            handle.shutdown().await;
            final_metrics.push((name, metrics.snapshot()));
        }
        info!(topic = %self.topic, published, "Dispatcher shutdown complete");
        final_metrics
    }
}

impl Transport for Dispatcher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn subscriber_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_alive()).count()
    }

    fn publish(&self, batch: Detection3DArray) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let batch = Arc::new(batch);

        for handle in self.handles.iter().filter(|h| h.is_alive()) {
            let envelope = Envelope {
                seq,
                batch: Arc::clone(&batch),
            };
            // The handle logs and counts the drop; the publisher is never blocked.
            if let Err(e) = handle.try_send(envelope) {
                trace!(topic = %self.topic, error = %e, "Delivery skipped");
            }
        }

        if (seq + 1).is_multiple_of(100) {
            debug!(topic = %self.topic, published = seq + 1, "Dispatcher progress");
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(topic, sink_configs))]
pub async fn create_dispatcher(
    topic: impl Into<String>,
    sink_configs: Vec<SinkConfig>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        topic: topic.into(),
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config).build().await
}
