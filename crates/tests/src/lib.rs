//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> dispatcher 装配
//! - generator -> dispatcher -> sinks 端到端数据流（无需外部服务）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::PublisherBlueprint;

    #[test]
    fn test_default_blueprint_round_trips_through_toml() {
        let toml = ConfigLoader::to_toml(&PublisherBlueprint::default()).unwrap();
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.node.topic, contracts::DEFAULT_TOPIC);
        assert_eq!(blueprint.node.frame_id, contracts::DEFAULT_FRAME_ID);
        assert_eq!(blueprint.sinks.len(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{SinkConfig, SinkType, SteppedClock, Time, Transport, DEFAULT_TOPIC};
    use dispatcher::create_dispatcher;
    use tokio::net::UdpSocket;
    use trajectory::{DetectionGenerator, CYCLE_TICKS};

    const TICK_NS: u64 = 100_000_000;

    fn file_sink(path: &std::path::Path) -> SinkConfig {
        SinkConfig {
            name: "jsonl".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 1000,
            params: HashMap::from([("path".to_string(), path.display().to_string())]),
        }
    }

    fn position(line: &serde_json::Value, idx: usize) -> (f64, f64, f64) {
        let p = &line["batch"]["detections"][idx]["bbox"]["center"]["position"];
        (
            p["x"].as_f64().unwrap(),
            p["y"].as_f64().unwrap(),
            p["z"].as_f64().unwrap(),
        )
    }

    /// End-to-end: DetectionGenerator -> Dispatcher -> FileSink
    ///
    /// 验证完整的数据流：
    /// 1. 每个 tick 产生一个 [human, AMR] batch
    /// 2. Dispatcher 顺序编号并写入 JSON Lines
    /// 3. 200 帧后轨迹回到起点
    #[tokio::test]
    async fn test_e2e_generator_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.jsonl");

        let dispatcher = create_dispatcher(DEFAULT_TOPIC, vec![file_sink(&path)])
            .await
            .unwrap();
        let clock = SteppedClock::new(Time::new(1_700_000_000, 0), TICK_NS);
        let mut generator = DetectionGenerator::new("map");

        let ticks = CYCLE_TICKS as usize + 5;
        for _ in 0..ticks {
            assert!(generator.tick(&dispatcher, &clock).is_some());
        }

        let final_metrics = dispatcher.shutdown().await;
        assert_eq!(final_metrics[0].1.write_count, ticks as u64);
        assert_eq!(final_metrics[0].1.dropped_count, 0);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), ticks);

        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line["seq"], i as u64);
            assert_eq!(line["batch"]["header"]["frame_id"], "map");
            assert_eq!(line["batch"]["detections"].as_array().unwrap().len(), 2);
            assert_eq!(
                line["batch"]["detections"][0]["results"][0]["hypothesis"]["class_id"],
                "human"
            );
            assert_eq!(
                line["batch"]["detections"][1]["results"][0]["hypothesis"]["class_id"],
                "AMR"
            );
        }

        // Counter 0 and its post-wrap repeat
        assert_eq!(position(&lines[0], 0), (0.0, 0.0, 0.95));
        assert_eq!(position(&lines[0], 1), (-1.0, -3.0, 0.4));
        assert_eq!(position(&lines[200], 0), position(&lines[0], 0));
        assert_eq!(position(&lines[200], 1), position(&lines[0], 1));

        // Counter 199
        let (x, y, _) = position(&lines[199], 1);
        assert!((x + 1.0).abs() < 1e-9);
        assert!((y + 2.8).abs() < 1e-9);

        // Stamps advance one tick per batch
        assert_eq!(lines[1]["batch"]["header"]["stamp"]["nanosec"], 100_000_000);
    }

    /// Zero subscribers: nothing is published and the trajectory does not advance
    #[tokio::test]
    async fn test_e2e_no_sinks_gates_publishing() {
        let dispatcher = create_dispatcher(DEFAULT_TOPIC, Vec::new()).await.unwrap();
        let clock = SteppedClock::frozen(Time::new(0, 0));
        let mut generator = DetectionGenerator::new("map");

        for _ in 0..10 {
            assert!(generator.tick(&dispatcher, &clock).is_none());
        }

        assert_eq!(generator.counter(), 0);
        assert_eq!(dispatcher.published_count(), 0);
        assert!(dispatcher.shutdown().await.is_empty());
    }

    /// Config text -> blueprint -> dispatcher with two sinks
    #[tokio::test]
    async fn test_e2e_config_to_multiple_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let config = format!(
            r#"
[node]
topic = "boxes"
frame_id = "odom"

[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "archive"
sink_type = "file"
queue_capacity = 100
[sinks.params]
dir = "{}"
"#,
            dir.path().display()
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let dispatcher = create_dispatcher(blueprint.node.topic.clone(), blueprint.sinks)
            .await
            .unwrap();
        assert_eq!(dispatcher.topic(), "boxes");
        assert_eq!(dispatcher.subscriber_count(), 2);

        let clock = SteppedClock::new(Time::new(0, 0), TICK_NS);
        let mut generator = DetectionGenerator::new(blueprint.node.frame_id);
        for _ in 0..3 {
            let batch = generator.tick(&dispatcher, &clock).unwrap();
            assert_eq!(batch.header.frame_id, "odom");
        }

        let final_metrics = dispatcher.shutdown().await;
        assert_eq!(final_metrics.len(), 2);
        assert!(final_metrics.iter().all(|(_, m)| m.write_count == 3));

        let written: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("detections_") && name.ends_with(".jsonl"));
    }

    /// DetectionGenerator -> Dispatcher -> NetworkSink (UDP, JSON)
    #[tokio::test]
    async fn test_e2e_network_sink_receives_batches() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = SinkConfig {
            name: "udp".to_string(),
            sink_type: SinkType::Network,
            queue_capacity: 10,
            params: HashMap::from([
                ("addr".to_string(), receiver.local_addr().unwrap().to_string()),
                ("format".to_string(), "json".to_string()),
            ]),
        };

        let dispatcher = create_dispatcher(DEFAULT_TOPIC, vec![sink]).await.unwrap();
        let clock = SteppedClock::new(Time::new(0, 0), TICK_NS);
        let mut generator = DetectionGenerator::new("map");
        generator.tick(&dispatcher, &clock).unwrap();

        let mut buf = vec![0u8; 65536];
        let len = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let datagram: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();

        assert_eq!(datagram["seq"], 0);
        assert_eq!(position(&datagram, 0), (0.0, 0.0, 0.95));
        assert_eq!(position(&datagram, 1), (-1.0, -3.0, 0.4));

        dispatcher.shutdown().await;
    }
}
