//! LogSink - logs batch summary via tracing

use contracts::{ContractError, DataSink, Detection3DArray};
use tracing::{debug, info, instrument};

/// Sink that logs batch summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, seq: u64, batch: &Detection3DArray) {
        info!(
            sink = %self.name,
            seq,
            stamp = batch.header.stamp.as_secs_f64(),
            frame_id = %batch.header.frame_id,
            detections = batch.detections.len(),
            "Detection3DArray received"
        );

        for detection in &batch.detections {
            let p = detection.bbox.center.position;
            debug!(
                sink = %self.name,
                seq,
                label = detection.label().unwrap_or("<none>"),
                x = p.x,
                y = p.y,
                z = p.z,
                "Detection"
            );
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, batch),
        fields(sink = %self.name)
    )]
    async fn write(&mut self, seq: u64, batch: &Detection3DArray) -> Result<(), ContractError> {
        self.log_batch_summary(seq, batch);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let result = sink.write(1, &Detection3DArray::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
