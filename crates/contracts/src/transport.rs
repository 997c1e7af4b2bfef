//! Transport & Clock - collaborators consumed by the generator
//!
//! The generator never talks to sinks or system time directly; it goes
//! through these two seams so that it can be driven by a test double.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{Detection3DArray, Time};

/// Default topic detection batches are published on
pub const DEFAULT_TOPIC: &str = "detection3_d_array";

/// Publish side of a pub/sub topic
pub trait Transport: Send + Sync {
    /// Topic name
    fn topic(&self) -> &str;

    /// Number of subscribers currently attached to the topic
    fn subscriber_count(&self) -> usize;

    /// Publish a batch (fire-and-forget)
    ///
    /// Delivery failures are handled by the transport itself and are
    /// never reported back to the caller.
    fn publish(&self, batch: Detection3DArray);
}

/// Source of header timestamps
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Time;
}

/// Wall clock backed by `SystemTime`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        // A clock set before 1970 stamps the epoch rather than failing.
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Time {
            sec: i32::try_from(elapsed.as_secs()).unwrap_or(i32::MAX),
            nanosec: elapsed.subsec_nanos(),
        }
    }
}

/// Deterministic clock that advances by a fixed step on every read
///
/// Used by tests and the offline `sample` command.
#[derive(Debug)]
pub struct SteppedClock {
    next_ns: AtomicU64,
    step_ns: u64,
}

impl SteppedClock {
    /// Start at `start` and advance by `step_ns` after each `now()`
    pub fn new(start: Time, step_ns: u64) -> Self {
        let start_ns = start.sec.max(0) as u64 * 1_000_000_000 + start.nanosec as u64;
        Self {
            next_ns: AtomicU64::new(start_ns),
            step_ns,
        }
    }

    /// Clock that always reports the same instant
    pub fn frozen(at: Time) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Time {
        let ns = self.next_ns.fetch_add(self.step_ns, Ordering::Relaxed);
        Time {
            sec: (ns / 1_000_000_000) as i32,
            nanosec: (ns % 1_000_000_000) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_epoch() {
        let now = SystemClock.now();
        assert!(now.sec > 0);
        assert!(now.nanosec < 1_000_000_000);
    }

    #[test]
    fn test_stepped_clock_advances() {
        let clock = SteppedClock::new(Time::new(10, 900_000_000), 100_000_000);
        assert_eq!(clock.now(), Time::new(10, 900_000_000));
        assert_eq!(clock.now(), Time::new(11, 0));
        assert_eq!(clock.now(), Time::new(11, 100_000_000));
    }

    #[test]
    fn test_frozen_clock() {
        let clock = SteppedClock::frozen(Time::new(5, 5));
        assert_eq!(clock.now(), clock.now());
    }
}
