//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::PublisherBlueprint;
use std::time::Duration;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Publisher, PublisherConfig};

use super::load_blueprint;

/// Execute the `run` command
pub async fn run_publisher(args: &RunArgs) -> Result<()> {
    let blueprint = resolve_blueprint(args)?;

    info!(
        node = %blueprint.node.name,
        topic = %blueprint.node.topic,
        frame_id = %blueprint.node.frame_id,
        period_ms = blueprint.node.period_ms,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let publisher_config = PublisherConfig {
        blueprint,
        max_ticks: (args.max_ticks > 0).then_some(args.max_ticks),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    let publisher = Publisher::new(publisher_config);

    info!("Starting publisher...");
    let stats = publisher
        .run(shutdown_signal())
        .await
        .context("Publisher execution failed")?;

    info!(
        published = stats.publish.published,
        skipped = stats.publish.skipped,
        dropped = stats.total_dropped(),
        duration_secs = stats.duration.as_secs_f64(),
        "Publisher completed"
    );
    stats.print_summary();

    Ok(())
}

/// Config file (or built-in defaults) with CLI overrides applied
fn resolve_blueprint(args: &RunArgs) -> Result<PublisherBlueprint, CliError> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            load_blueprint(path)?
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            PublisherBlueprint::default()
        }
    };

    if let Some(period_ms) = args.period_ms {
        if period_ms == 0 {
            return Err(CliError::invalid_argument("period-ms", "must be >= 1"));
        }
        info!(period_ms, "Overriding timer period from CLI");
        blueprint.node.period_ms = period_ms;
    }
    if let Some(ref frame_id) = args.frame_id {
        if frame_id.is_empty() {
            return Err(CliError::invalid_argument("frame-id", "cannot be empty"));
        }
        info!(frame_id = %frame_id, "Overriding frame id from CLI");
        blueprint.node.frame_id = frame_id.clone();
    }

    config_loader::ConfigLoader::validate(&blueprint)?;
    Ok(blueprint)
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &PublisherBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Node:");
    println!("  Name: {}", blueprint.node.name);
    println!("  Topic: {}", blueprint.node.topic);
    println!("  Frame: {}", blueprint.node.frame_id);
    println!("  Period: {} ms", blueprint.node.period_ms);

    if blueprint.sinks.is_empty() {
        println!("\nSinks: none (nothing will be published)");
    } else {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!(
                "  - {} ({:?}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn run_args() -> RunArgs {
        RunArgs {
            config: None,
            period_ms: None,
            frame_id: None,
            max_ticks: 0,
            timeout: 0,
            dry_run: true,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let blueprint = resolve_blueprint(&run_args()).unwrap();
        assert_eq!(blueprint.node.frame_id, "map");
        assert_eq!(blueprint.node.period_ms, 100);
        assert_eq!(blueprint.sinks.len(), 1);
    }

    #[test]
    fn test_overrides_applied() {
        let mut args = run_args();
        args.period_ms = Some(20);
        args.frame_id = Some("odom".to_string());

        let blueprint = resolve_blueprint(&args).unwrap();
        assert_eq!(blueprint.node.period_ms, 20);
        assert_eq!(blueprint.node.frame_id, "odom");
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut args = run_args();
        args.period_ms = Some(0);
        let err = resolve_blueprint(&args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let mut args = run_args();
        args.config = Some("/nonexistent/publisher.toml".into());
        let err = resolve_blueprint(&args).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_config_file_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[node]\nframe_id = \"base_link\"\nperiod_ms = 50").unwrap();

        let mut args = run_args();
        args.config = Some(file.path().to_path_buf());

        let blueprint = resolve_blueprint(&args).unwrap();
        assert_eq!(blueprint.node.frame_id, "base_link");
        assert_eq!(blueprint.node.period_ms, 50);
    }
}
