//! # Trajectory
//!
//! Synthetic detection generator.
//!
//! 负责：
//! - 维护仿真帧计数器 (200 帧一个周期)
//! - 按四段分段线性公式计算 human / AMR 的包围盒位置
//! - 组装 `Detection3DArray` 并交给 transport 发布
//!
//! The per-counter computation is pure ([`DetectionGenerator::batch_at`]);
//! only [`DetectionGenerator::tick`] touches the transport and the clock.
//!
//! # Example
//!
//! ```
//! use contracts::{SteppedClock, Time};
//! use trajectory::DetectionGenerator;
//!
//! let generator = DetectionGenerator::new("map");
//! let clock = SteppedClock::frozen(Time::new(0, 0));
//! let batch = generator.batch_at(0, generator.header(&clock));
//! assert_eq!(batch.detections.len(), 2);
//! ```

mod agent;
mod clock;
mod generator;
mod quaternion;

pub use agent::{Agent, Phase};
pub use clock::{SimulationClock, CYCLE_TICKS, PHASE_TICKS};
pub use generator::DetectionGenerator;
pub use quaternion::quaternion_about_axis;
