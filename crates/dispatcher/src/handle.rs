//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DataSink, Detection3DArray};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;

/// A published batch together with its topic sequence number
///
/// The batch is shared between all sink queues.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub seq: u64,
    pub batch: Arc<Detection3DArray>,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send batches to worker
    tx: mpsc::Sender<Envelope>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
    /// Set once the closed worker has been reported
    closed_reported: AtomicBool,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: DataSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
            closed_reported: AtomicBool::new(false),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Whether the worker is still consuming batches
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a batch for the sink (non-blocking)
    ///
    /// A full queue drops the batch for this sink only.
    pub fn try_send(&self, envelope: Envelope) -> Result<(), DispatcherError> {
        match self.tx.try_send(envelope) {
            Ok(()) => {
                self.metrics.inc_enqueued_count();
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(e)) => {
                self.metrics.inc_dropped_count();
                warn!(sink = %self.name, seq = e.seq, "Queue full, batch dropped");
                Err(DispatcherError::QueueFull {
                    sink_name: self.name.clone(),
                    seq: e.seq,
                })
            }
            Err(mpsc::error::TrySendError::Closed(e)) => {
                self.metrics.inc_dropped_count();
                if !self.closed_reported.swap(true, Ordering::Relaxed) {
                    error!(sink = %self.name, "Sink worker closed unexpectedly");
                }
                Err(DispatcherError::SinkClosed {
                    sink_name: self.name.clone(),
                    seq: e.seq,
                })
            }
        }
    }

    /// Shutdown the sink worker gracefully
    ///
    /// Batches already queued are still written before the sink is closed.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes batches and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Envelope>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(envelope) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(envelope.seq, &envelope.batch).await {
            Ok(()) => metrics.record_write(envelope.seq),
            Err(e) => {
                metrics.inc_failure_count();
                error!(sink = %name, seq = envelope.seq, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
