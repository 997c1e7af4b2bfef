//! `sample` command implementation.
//!
//! Prints the deterministic trajectory for a counter range without
//! starting any sink, so consumers can be checked offline.

use anyhow::{Context, Result};
use contracts::{Detection3DArray, SteppedClock, Time, DEFAULT_PERIOD_MS};
use serde::Serialize;
use tracing::debug;
use trajectory::{DetectionGenerator, Phase, CYCLE_TICKS};

use crate::cli::SampleArgs;
use crate::error::CliError;

#[derive(Serialize)]
struct SampleLine<'a> {
    counter: u32,
    #[serde(flatten)]
    batch: &'a Detection3DArray,
}

/// Execute the `sample` command
pub fn run_sample(args: &SampleArgs) -> Result<()> {
    if args.from >= CYCLE_TICKS {
        return Err(CliError::invalid_argument(
            "from",
            format!("must be below the cycle length {}", CYCLE_TICKS),
        )
        .into());
    }

    debug!(from = args.from, count = args.count, "Sampling trajectory");

    for (counter, batch) in sample_batches(args) {
        if args.json {
            let line = serde_json::to_string(&SampleLine {
                counter,
                batch: &batch,
            })
            .context("Failed to serialize sample")?;
            println!("{}", line);
        } else {
            println!("{}", format_row(counter, &batch));
        }
    }

    Ok(())
}

/// Counter values and batches for the requested range, wrapping at the cycle end
fn sample_batches(args: &SampleArgs) -> Vec<(u32, Detection3DArray)> {
    let generator = DetectionGenerator::new(args.frame_id.clone());
    let clock = SteppedClock::new(Time::new(0, 0), DEFAULT_PERIOD_MS * 1_000_000);

    (0..args.count)
        .map(|offset| {
            let counter = (args.from + offset % CYCLE_TICKS) % CYCLE_TICKS;
            let header = generator.header(&clock);
            (counter, generator.batch_at(counter, header))
        })
        .collect()
}

fn format_row(counter: u32, batch: &Detection3DArray) -> String {
    let mut row = format!("c={:3} phase={}", counter, Phase::of(counter).index());
    for detection in &batch.detections {
        let p = detection.bbox.center.position;
        row.push_str(&format!(
            "  {:>5} ({:7.3}, {:7.3}, {:5.2})",
            detection.label().unwrap_or("?"),
            p.x,
            p.y,
            p.z
        ));
    }
    row
}
