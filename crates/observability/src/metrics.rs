//! 发布指标收集模块
//!
//! 记录每个定时周期的发布结果，并在内存中聚合统计。

use std::collections::BTreeMap;
use std::time::Instant;

use contracts::Detection3DArray;
use metrics::{counter, gauge, histogram};

/// 记录一次成功发布
///
/// `counter` 为本次发布使用的仿真计数器值。
pub fn record_batch_published(counter: u32, batch: &Detection3DArray) {
    counter!("box_publisher_batches_published_total").increment(1);

    // 计数器 (用于检测跳帧)
    gauge!("box_publisher_sim_counter").set(counter as f64);

    histogram!("box_publisher_detections_per_batch").record(batch.len() as f64);

    for detection in &batch.detections {
        let label = detection.label().unwrap_or("unknown").to_string();
        let p = detection.bbox.center.position;
        gauge!("box_publisher_agent_x", "label" => label.clone()).set(p.x);
        gauge!("box_publisher_agent_y", "label" => label).set(p.y);
    }
}

/// 记录因无订阅者而跳过的周期
pub fn record_tick_skipped() {
    counter!("box_publisher_ticks_skipped_total").increment(1);
}

/// 记录两次定时回调之间的实际间隔
pub fn record_tick_interval_ms(interval_ms: f64) {
    histogram!("box_publisher_tick_interval_ms").record(interval_ms);
}

/// 同步 sink 的累计投递结果
///
/// 参数均为累计值，按 status 标签写入计数器。
pub fn record_sink_totals(sink_name: &str, written: u64, failed: u64, dropped: u64) {
    for (status, total) in [("success", written), ("failure", failed), ("dropped", dropped)] {
        counter!(
            "box_publisher_sink_writes_total",
            "sink" => sink_name.to_string(),
            "status" => status
        )
        .absolute(total);
    }
}

/// 记录 sink 队列深度
pub fn record_sink_queue_len(sink_name: &str, queue_len: usize) {
    gauge!("box_publisher_sink_queue_len", "sink" => sink_name.to_string()).set(queue_len as f64);
}

/// 发布统计聚合器
///
/// 在内存中聚合指标，便于在退出时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PublishStatsAggregator {
    /// 定时回调总次数
    pub total_ticks: u64,

    /// 已发布的 batch 数
    pub published: u64,

    /// 无订阅者跳过的次数
    pub skipped: u64,

    /// 完成的巡逻周期数
    pub cycles_completed: u64,

    /// 各标签累计检测数
    pub detections_per_label: BTreeMap<String, u64>,

    /// 回调间隔统计 (毫秒)
    pub interval_stats: RunningStats,

    last_tick: Option<Instant>,
}

impl PublishStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次回调的发生时间
    fn observe_tick(&mut self, at: Instant) -> Option<f64> {
        self.total_ticks += 1;
        let interval = self
            .last_tick
            .map(|prev| at.saturating_duration_since(prev).as_secs_f64() * 1000.0);
        if let Some(ms) = interval {
            self.interval_stats.push(ms);
        }
        self.last_tick = Some(at);
        interval
    }

    /// 记录一次发布；返回与上次回调的间隔 (毫秒)
    pub fn update_published(&mut self, batch: &Detection3DArray, at: Instant) -> Option<f64> {
        self.published += 1;
        for detection in &batch.detections {
            let label = detection.label().unwrap_or("unknown");
            *self.detections_per_label.entry(label.to_string()).or_insert(0) += 1;
        }
        self.observe_tick(at)
    }

    /// 记录一次跳过；返回与上次回调的间隔 (毫秒)
    pub fn update_skipped(&mut self, at: Instant) -> Option<f64> {
        self.skipped += 1;
        self.observe_tick(at)
    }

    /// 记录完成一个巡逻周期
    pub fn record_cycle(&mut self) {
        self.cycles_completed += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> PublishSummary {
        PublishSummary {
            total_ticks: self.total_ticks,
            published: self.published,
            skipped: self.skipped,
            cycles_completed: self.cycles_completed,
            publish_rate: if self.total_ticks > 0 {
                self.published as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            tick_interval_ms: StatsSummary::from(&self.interval_stats),
            detections_per_label: self.detections_per_label.clone(),
        }
    }
}

/// 发布摘要
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    pub total_ticks: u64,
    pub published: u64,
    pub skipped: u64,
    pub cycles_completed: u64,
    /// Published ticks as a percentage of all ticks
    pub publish_rate: f64,
    pub tick_interval_ms: StatsSummary,
    pub detections_per_label: BTreeMap<String, u64>,
}

impl std::fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Publish Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(
            f,
            "Published: {} ({:.2}%)",
            self.published, self.publish_rate
        )?;
        writeln!(f, "Skipped (no subscribers): {}", self.skipped)?;
        writeln!(f, "Patrol cycles completed: {}", self.cycles_completed)?;
        writeln!(f, "Tick interval (ms): {}", self.tick_interval_ms)?;

        if !self.detections_per_label.is_empty() {
            writeln!(f, "Detections per label:")?;
            for (label, count) in &self.detections_per_label {
                writeln!(f, "  {}: {}", label, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        BoundingBox3D, Detection3D, Header, ObjectHypothesisWithPose, Vector3,
    };
    use std::time::Duration;

    fn batch_with(labels: &[&str]) -> Detection3DArray {
        let header = Header::default();
        let detections = labels
            .iter()
            .map(|label| Detection3D {
                header: header.clone(),
                results: vec![ObjectHypothesisWithPose::new(*label, 1.0)],
                bbox: BoundingBox3D::on_ground(1.0, 2.0, Vector3 { x: 1.0, y: 1.0, z: 1.0 }),
                id: String::new(),
            })
            .collect();
        Detection3DArray { header, detections }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_intervals() {
        let mut aggregator = PublishStatsAggregator::new();
        let start = Instant::now();

        assert_eq!(aggregator.update_skipped(start), None);
        let interval = aggregator
            .update_published(&batch_with(&["human", "AMR"]), start + Duration::from_millis(100))
            .unwrap();
        assert!((interval - 100.0).abs() < 1e-6);
        aggregator.update_published(&batch_with(&["human", "AMR"]), start + Duration::from_millis(200));

        assert_eq!(aggregator.total_ticks, 3);
        assert_eq!(aggregator.published, 2);
        assert_eq!(aggregator.skipped, 1);
        assert_eq!(aggregator.interval_stats.count(), 2);
        assert_eq!(aggregator.detections_per_label.get("AMR"), Some(&2));
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = PublishStatsAggregator::new();
        let start = Instant::now();
        for i in 0..4 {
            aggregator.update_published(&batch_with(&["human"]), start + Duration::from_millis(100 * i));
        }
        aggregator.record_cycle();

        let summary = aggregator.summary();
        assert!((summary.publish_rate - 100.0).abs() < 1e-10);

        let output = format!("{}", summary);
        assert!(output.contains("Total ticks: 4"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("Patrol cycles completed: 1"));
        assert!(output.contains("human: 4"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = PublishStatsAggregator::new().summary();
        assert_eq!(summary.total_ticks, 0);
        assert_eq!(summary.publish_rate, 0.0);
        assert_eq!(format!("{}", summary.tick_interval_ms), "N/A");
    }
}
