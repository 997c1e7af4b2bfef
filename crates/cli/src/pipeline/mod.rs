//! Publisher orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Publisher, PublisherConfig};
pub use stats::PublisherStats;
