//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::PublisherBlueprint;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use trajectory::{Agent, CYCLE_TICKS, PHASE_TICKS};

use crate::cli::InfoArgs;

use super::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    node: NodeInfo,
    sinks: Vec<SinkInfo>,
    agents: Vec<AgentInfo>,
}

#[derive(Serialize)]
struct NodeInfo {
    name: String,
    topic: String,
    frame_id: String,
    period_ms: u64,
    cycle_ticks: u32,
    phase_ticks: u32,
    cycle_secs: f64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

#[derive(Serialize)]
struct AgentInfo {
    label: &'static str,
    score: f64,
    size: [f64; 3],
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &PublisherBlueprint) -> ConfigInfo {
    let node = &blueprint.node;

    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            queue_capacity: s.queue_capacity,
            params: s.params.clone(),
        })
        .collect();

    let agents = Agent::ALL
        .iter()
        .map(|agent| {
            let size = agent.size();
            AgentInfo {
                label: agent.label(),
                score: agent.score(),
                size: [size.x, size.y, size.z],
            }
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        node: NodeInfo {
            name: node.name.clone(),
            topic: node.topic.clone(),
            frame_id: node.frame_id.clone(),
            period_ms: node.period_ms,
            cycle_ticks: CYCLE_TICKS,
            phase_ticks: PHASE_TICKS,
            cycle_secs: node.period().as_secs_f64() * CYCLE_TICKS as f64,
        },
        sinks,
        agents,
    }
}

fn print_config_info(blueprint: &PublisherBlueprint) {
    let info = build_config_info(blueprint);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Box Publisher Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Node");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Name: {}", info.node.name);
    println!("   ├─ Topic: {}", info.node.topic);
    println!("   ├─ Frame: {}", info.node.frame_id);
    println!("   ├─ Period: {} ms", info.node.period_ms);
    println!(
        "   └─ Patrol cycle: {} ticks ({} per side, {:.1}s)",
        info.node.cycle_ticks, info.node.phase_ticks, info.node.cycle_secs
    );

    println!("\n🚶 Agents ({})", info.agents.len());
    for (i, agent) in info.agents.iter().enumerate() {
        let prefix = if i + 1 == info.agents.len() { "└─" } else { "├─" };
        println!(
            "   {} {} (score {}, size {:.1} x {:.1} x {:.1})",
            prefix, agent.label, agent.score, agent.size[0], agent.size[1], agent.size[2]
        );
    }

    if info.sinks.is_empty() {
        println!("\n📤 Sinks: none (nothing will be published)");
    } else {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i + 1 == info.sinks.len() { "└─" } else { "├─" };
            println!(
                "   {} {} ({}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
