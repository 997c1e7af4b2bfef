//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! the detection message layout, the transport/clock seams the generator
//! talks to, the sink trait and the publisher configuration.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Message Model
//! - Field layout follows `vision_msgs/Detection3DArray`
//! - Timestamps are wall-clock `sec` + `nanosec`, like `builtin_interfaces/Time`

mod blueprint;
mod detection;
mod error;
mod sink;
mod transport;

pub use blueprint::*;
pub use detection::*;
pub use error::*;
pub use sink::*;
pub use transport::*;
