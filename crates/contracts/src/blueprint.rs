//! PublisherBlueprint - Config Loader output
//!
//! 描述发布器的完整配置：节点参数 (topic / frame / 周期) 与输出路由。
//! Every node field defaults to the reference demo constants, so an empty
//! file reproduces the stock publisher.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::DEFAULT_TOPIC;

/// Default node name
pub const DEFAULT_NODE_NAME: &str = "pub_detection3_d_array_sample";

/// Default reference frame stamped on every header
pub const DEFAULT_FRAME_ID: &str = "map";

/// Default timer period (10 Hz)
pub const DEFAULT_PERIOD_MS: u64 = 100;

/// Default per-sink queue depth (matches a QoS history depth of 10)
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的发布器配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublisherBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 节点设置
    #[serde(default)]
    #[validate(nested)]
    pub node: NodeConfig,

    /// 输出路由配置 (每个 sink 即一个订阅者)
    #[serde(default = "default_sinks")]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

impl Default for PublisherBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            node: NodeConfig::default(),
            sinks: default_sinks(),
        }
    }
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig::log("console")]
}

/// 节点配置：名称、话题、坐标系、定时周期
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NodeConfig {
    /// 节点名称
    #[serde(default = "default_node_name")]
    #[validate(length(min = 1, message = "node name cannot be empty"))]
    pub name: String,

    /// 发布话题
    #[serde(default = "default_topic")]
    #[validate(length(min = 1, message = "topic cannot be empty"))]
    pub topic: String,

    /// Header 中的参考坐标系
    #[serde(default = "default_frame_id")]
    #[validate(length(min = 1, message = "frame_id cannot be empty"))]
    pub frame_id: String,

    /// 定时器周期 (毫秒)
    #[serde(default = "default_period_ms")]
    #[validate(range(min = 1, message = "period_ms must be >= 1"))]
    pub period_ms: u64,
}

impl NodeConfig {
    /// Timer period as a `Duration`
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
            topic: default_topic(),
            frame_id: default_frame_id(),
            period_ms: default_period_ms(),
        }
    }
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_frame_id() -> String {
    DEFAULT_FRAME_ID.to_string()
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink 名称
    #[validate(length(min = 1, message = "sink name cannot be empty"))]
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be >= 1"))]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Log sink with default queue depth
    pub fn log(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Log,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            params: HashMap::new(),
        }
    }
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 文件输出 (JSON Lines)
    File,
    /// 网络输出 (UDP)
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_blueprint_matches_reference_node() {
        let blueprint = PublisherBlueprint::default();
        assert_eq!(blueprint.node.topic, "detection3_d_array");
        assert_eq!(blueprint.node.frame_id, "map");
        assert_eq!(blueprint.node.period(), Duration::from_millis(100));
        assert_eq!(blueprint.sinks.len(), 1);
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::Log);
        assert!(blueprint.validate().is_ok());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let blueprint: PublisherBlueprint = serde_json::from_str("{}").unwrap();
        assert_eq!(blueprint.node.name, DEFAULT_NODE_NAME);
        assert_eq!(blueprint.sinks.len(), 1);

        let silent: PublisherBlueprint = serde_json::from_str(r#"{"sinks": []}"#).unwrap();
        assert!(silent.sinks.is_empty());
    }

    #[test]
    fn derive_validation_rejects_zero_period() {
        let mut blueprint = PublisherBlueprint::default();
        blueprint.node.period_ms = 0;
        let err = blueprint.validate().unwrap_err();
        assert!(err.to_string().contains("period_ms"), "got: {err}");
    }

    #[test]
    fn derive_validation_rejects_empty_sink_name() {
        let mut blueprint = PublisherBlueprint::default();
        blueprint.sinks[0].name = String::new();
        assert!(blueprint.validate().is_err());
    }
}
