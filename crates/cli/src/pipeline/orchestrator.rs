//! Publisher orchestrator - drives the generator from a periodic timer.
//!
//! One tick = one call to [`DetectionGenerator::tick`] against the
//! dispatcher. Ticks never overlap: the loop awaits each tick before the
//! next timer fire is polled.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{PublisherBlueprint, SystemClock, Transport};
use dispatcher::Dispatcher;
use observability::{
    record_batch_published, record_sink_queue_len, record_sink_totals, record_tick_interval_ms,
    record_tick_skipped,
};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use trajectory::{DetectionGenerator, CYCLE_TICKS};

use super::PublisherStats;

/// Sink totals are exported to the metrics facade every this many ticks
const SINK_REPORT_EVERY: u64 = 50;

/// Grace period for sinks to drain on shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Publisher configuration
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// The publisher blueprint
    pub blueprint: PublisherBlueprint,

    /// Maximum number of batches to publish (None = unlimited)
    pub max_ticks: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main publisher orchestrator
pub struct Publisher {
    config: PublisherConfig,
}

impl Publisher {
    /// Create a new publisher with the given configuration
    pub fn new(config: PublisherConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the tick limit is hit or the timeout expires
    pub async fn run<F>(self, shutdown: F) -> Result<PublisherStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let node = &self.config.blueprint.node;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let dispatcher = dispatcher::create_dispatcher(
            node.topic.clone(),
            self.config.blueprint.sinks.clone(),
        )
        .await
        .context("Failed to create dispatcher")?;

        let active_sinks = dispatcher.subscriber_count();
        if active_sinks == 0 {
            warn!(topic = %node.topic, "No sinks configured - ticks will be skipped");
        }

        let mut generator = DetectionGenerator::new(node.frame_id.clone());

        info!(
            node = %node.name,
            topic = %node.topic,
            frame_id = %node.frame_id,
            period_ms = node.period_ms,
            sinks = active_sinks,
            max_ticks = ?self.config.max_ticks,
            "Publisher running"
        );

        let mut stats = PublisherStats {
            active_sinks,
            ..Default::default()
        };

        let timed_out = self
            .tick_loop(&dispatcher, &mut generator, &mut stats, shutdown)
            .await;
        if timed_out {
            warn!(
                timeout_secs = self.config.timeout.map(|t| t.as_secs_f64()),
                "Publisher timed out"
            );
        }

        // Shutdown
        info!("Shutting down publisher...");
        match time::timeout(DRAIN_TIMEOUT, dispatcher.shutdown()).await {
            Ok(final_metrics) => {
                for (name, m) in &final_metrics {
                    record_sink_totals(name, m.write_count, m.failure_count, m.dropped_count);
                    record_sink_queue_len(name, m.queue_len);
                }
                stats.sink_metrics = final_metrics;
            }
            Err(_) => warn!(
                timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "Sinks did not drain in time"
            ),
        }

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            published = stats.publish.published,
            rate_hz = format!("{:.2}", stats.publish_hz()),
            "Publisher shutdown complete"
        );

        Ok(stats)
    }

    /// Timer loop; returns `true` when the run ended on timeout
    async fn tick_loop<F>(
        &self,
        dispatcher: &Dispatcher,
        generator: &mut DetectionGenerator,
        stats: &mut PublisherStats,
        shutdown: F,
    ) -> bool
    where
        F: Future<Output = ()>,
    {
        let period = self.config.blueprint.node.period();

        // First fire one period after start, like a wall timer.
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(t) => time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping publisher...");
                    return false;
                }
                _ = &mut deadline => return true,
                _ = interval.tick() => {}
            }

            let counter = generator.counter() % CYCLE_TICKS;
            let now = Instant::now();

            let interval_ms = match generator.tick(dispatcher, &SystemClock) {
                Some(batch) => {
                    record_batch_published(counter, &batch);
                    let interval_ms = stats.publish.update_published(&batch, now);
                    if generator.counter() >= CYCLE_TICKS {
                        stats.publish.record_cycle();
                        debug!(cycles = stats.publish.cycles_completed, "Patrol cycle published");
                    }
                    interval_ms
                }
                None => {
                    record_tick_skipped();
                    stats.publish.update_skipped(now)
                }
            };
            if let Some(ms) = interval_ms {
                record_tick_interval_ms(ms);
            }

            if stats.publish.total_ticks.is_multiple_of(SINK_REPORT_EVERY) {
                for (name, m) in dispatcher.metrics() {
                    record_sink_totals(&name, m.write_count, m.failure_count, m.dropped_count);
                    record_sink_queue_len(&name, m.queue_len);
                }
            }

            if let Some(max) = self.config.max_ticks {
                if stats.publish.published >= max {
                    info!(published = stats.publish.published, "Reached max ticks limit");
                    return false;
                }
            }
        }
    }
}
