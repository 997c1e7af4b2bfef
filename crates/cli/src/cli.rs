//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Box Publisher - synthetic 3D detection publisher for patrol demos
#[derive(Parser, Debug)]
#[command(
    name = "box-publisher",
    author,
    version,
    about = "Synthetic Detection3DArray publisher",
    long_about = "Publishes a human and an AMR bounding box walking rectangular patrol \n\
                  paths, one batch per timer tick, to the configured sinks.\n\n\
                  Nothing is published while no sink is attached."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BOX_PUBLISHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BOX_PUBLISHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the publisher timer loop
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Print the deterministic trajectory without publishing
    Sample(SampleArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when absent
    #[arg(short, long, env = "BOX_PUBLISHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the timer period in milliseconds
    #[arg(long, env = "BOX_PUBLISHER_PERIOD_MS")]
    pub period_ms: Option<u64>,

    /// Override the header frame id
    #[arg(long, env = "BOX_PUBLISHER_FRAME_ID")]
    pub frame_id: Option<String>,

    /// Maximum number of batches to publish (0 = unlimited)
    #[arg(long, default_value = "0", env = "BOX_PUBLISHER_MAX_TICKS")]
    pub max_ticks: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "BOX_PUBLISHER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BOX_PUBLISHER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sample` command
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// First counter value
    #[arg(long, default_value = "0")]
    pub from: u32,

    /// Number of consecutive ticks to print
    #[arg(long, default_value = "10")]
    pub count: u32,

    /// Header frame id
    #[arg(long, default_value = "map")]
    pub frame_id: String,

    /// Print full Detection3DArray messages as JSON Lines
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
