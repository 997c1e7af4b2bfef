//! SimulationClock - cyclic frame counter

/// Length of one patrol cycle in ticks
pub const CYCLE_TICKS: u32 = 200;

/// Length of one phase (one side of the patrol rectangle) in ticks
pub const PHASE_TICKS: u32 = 50;

/// Frame counter driving the trajectories
///
/// Advanced once per published tick. The wrap check happens at the top of
/// a tick, so the value handed to the trajectory formulas is always in
/// `[0, CYCLE_TICKS)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    counter: u32,
}

impl SimulationClock {
    /// Clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock at an arbitrary counter value (may be past the wrap threshold)
    pub fn starting_at(counter: u32) -> Self {
        Self { counter }
    }

    /// Current counter value
    pub fn value(&self) -> u32 {
        self.counter
    }

    /// Reset to 0 when the counter has reached the cycle length
    ///
    /// Returns true if a reset happened.
    pub fn wrap(&mut self) -> bool {
        if self.counter >= CYCLE_TICKS {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Step to the next tick
    pub fn advance(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }
}
