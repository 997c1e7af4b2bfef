//! Per-sink delivery counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Batches waiting in the sink queue
    queue_len: AtomicUsize,
    /// Highest queue depth seen so far
    peak_queue_len: AtomicUsize,
    /// Batches accepted into the queue
    enqueued_count: AtomicU64,
    /// Total successful writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
    /// Batches dropped because the queue was full or the worker was gone
    dropped_count: AtomicU64,
    /// Sequence number of the last batch written
    last_seq: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn peak_queue_len(&self) -> usize {
        self.peak_queue_len.load(Ordering::Relaxed)
    }

    /// Record the current queue depth and keep the high-water mark
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
        self.peak_queue_len.fetch_max(len, Ordering::Relaxed);
    }

    pub fn enqueued_count(&self) -> u64 {
        self.enqueued_count.load(Ordering::Relaxed)
    }

    pub fn inc_enqueued_count(&self) {
        self.enqueued_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Record a successful write of batch `seq`
    pub fn record_write(&self, seq: u64) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.last_seq.store(seq, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            peak_queue_len: self.peak_queue_len(),
            enqueued_count: self.enqueued_count(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
            last_seq: self.last_seq(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub peak_queue_len: usize,
    pub enqueued_count: u64,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
    pub last_seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = SinkMetrics::new();
        metrics.inc_enqueued_count();
        metrics.inc_enqueued_count();
        metrics.record_write(7);
        metrics.inc_failure_count();
        metrics.inc_dropped_count();

        let snap = metrics.snapshot();
        assert_eq!(snap.enqueued_count, 2);
        assert_eq!(snap.write_count, 1);
        assert_eq!(snap.failure_count, 1);
        assert_eq!(snap.dropped_count, 1);
        assert_eq!(snap.last_seq, 7);
    }

    #[test]
    fn test_queue_len_keeps_peak() {
        let metrics = SinkMetrics::new();
        metrics.set_queue_len(3);
        metrics.set_queue_len(1);

        let snap = metrics.snapshot();
        assert_eq!(snap.queue_len, 1);
        assert_eq!(snap.peak_queue_len, 3);
    }
}
