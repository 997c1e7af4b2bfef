//! Publisher run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::PublishStatsAggregator;

/// Statistics from a publisher run
#[derive(Debug, Clone, Default)]
pub struct PublisherStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Number of sinks attached at start-up
    pub active_sinks: usize,

    /// Tick / publish aggregation
    pub publish: PublishStatsAggregator,

    /// Final per-sink delivery counters
    pub sink_metrics: Vec<(String, MetricsSnapshot)>,
}

impl PublisherStats {
    /// Published batches per second
    pub fn publish_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.publish.published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Batches dropped across all sinks
    pub fn total_dropped(&self) -> u64 {
        self.sink_metrics.iter().map(|(_, m)| m.dropped_count).sum()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Publisher Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let summary = self.publish.summary();

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Ticks: {}", summary.total_ticks);
        println!(
            "   ├─ Published: {} ({:.2}%)",
            summary.published, summary.publish_rate
        );
        println!("   ├─ Skipped (no subscribers): {}", summary.skipped);
        println!("   ├─ Patrol cycles: {}", summary.cycles_completed);
        println!("   ├─ Rate: {:.2} Hz", self.publish_hz());
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n⏱  Tick interval (ms)");
        println!("   └─ {}", summary.tick_interval_ms);

        if !self.sink_metrics.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, m)) in self.sink_metrics.iter().enumerate() {
                let prefix = if i + 1 == self.sink_metrics.len() {
                    "└─"
                } else {
                    "├─"
                };
                println!("   {} {}", prefix, sink_line(name, m));
            }
        }

        println!();
    }
}

fn sink_line(name: &str, m: &MetricsSnapshot) -> String {
    format!(
        "{}: written={}, failed={}, dropped={}, peak_queue={}",
        name, m.write_count, m.failure_count, m.dropped_count, m.peak_queue_len
    )
}
