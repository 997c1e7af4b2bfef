//! Simulated agents and their patrol formulas
//!
//! Both agents walk a rectangle, one side per 50-tick phase. The formulas
//! are piecewise linear in the counter and are *not* continuous at every
//! phase boundary; the jumps are part of the demo and are kept as is.

use contracts::{BoundingBox3D, Detection3D, Header, ObjectHypothesisWithPose, Vector3};

use crate::clock::{CYCLE_TICKS, PHASE_TICKS};

/// One side of the patrol rectangle, derived from the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Ticks [0, 50)
    First,
    /// Ticks [50, 100)
    Second,
    /// Ticks [100, 150)
    Third,
    /// Ticks [150, 200)
    Fourth,
}

impl Phase {
    /// Phase of a counter value, taken modulo the cycle length
    pub fn of(counter: u32) -> Self {
        let counter = counter % CYCLE_TICKS;
        if counter < PHASE_TICKS {
            Phase::First
        } else if counter < 2 * PHASE_TICKS {
            Phase::Second
        } else if counter < 3 * PHASE_TICKS {
            Phase::Third
        } else {
            Phase::Fourth
        }
    }

    /// Zero-based index of the phase
    pub fn index(self) -> usize {
        match self {
            Phase::First => 0,
            Phase::Second => 1,
            Phase::Third => 2,
            Phase::Fourth => 3,
        }
    }
}

/// The simulated agents, in publish order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    /// Pedestrian
    Human,
    /// Autonomous mobile robot
    Amr,
}

impl Agent {
    /// All agents in the order they appear in a batch
    pub const ALL: [Agent; 2] = [Agent::Human, Agent::Amr];

    /// Class label of the single hypothesis
    pub fn label(self) -> &'static str {
        match self {
            Agent::Human => "human",
            Agent::Amr => "AMR",
        }
    }

    /// Confidence score of the single hypothesis
    pub fn score(self) -> f64 {
        match self {
            Agent::Human => 20.0,
            Agent::Amr => 40.0,
        }
    }

    /// Box extents
    pub fn size(self) -> Vector3 {
        match self {
            Agent::Human => Vector3 {
                x: 0.8,
                y: 0.6,
                z: 1.9,
            },
            Agent::Amr => Vector3 {
                x: 0.8,
                y: 0.6,
                z: 0.8,
            },
        }
    }

    /// Ground-plane position (x, y) at the given counter
    pub fn position(self, counter: u32) -> (f64, f64) {
        let phase = Phase::of(counter);
        let c = f64::from(counter % CYCLE_TICKS);

        match (self, phase) {
            (Agent::Human, Phase::First) => (0.0 + 0.1 * c, 0.0),
            (Agent::Human, Phase::Second) => (5.0, -5.0 + 0.1 * c),
            (Agent::Human, Phase::Third) => (15.0 - 0.1 * c, 5.0),
            (Agent::Human, Phase::Fourth) => (0.0, 20.0 - 0.1 * c),

            // Twice the human rectangle, shifted by (-1, -3)
            (Agent::Amr, Phase::First) => (0.0 + 0.2 * c - 1.0, -3.0),
            (Agent::Amr, Phase::Second) => (10.0 - 1.0, -10.0 + 0.2 * c - 3.0),
            (Agent::Amr, Phase::Third) => (30.0 - 0.2 * c - 1.0, 10.0 - 3.0),
            (Agent::Amr, Phase::Fourth) => (0.0 - 1.0, 40.0 - 0.2 * c - 3.0),
        }
    }

    /// Bounding box at the given counter, resting on the ground plane
    pub fn bounding_box(self, counter: u32) -> BoundingBox3D {
        let (x, y) = self.position(counter);
        BoundingBox3D::on_ground(x, y, self.size())
    }

    /// Full detection record at the given counter
    pub fn detect(self, counter: u32, header: &Header) -> Detection3D {
        Detection3D {
            header: header.clone(),
            results: vec![ObjectHypothesisWithPose::new(self.label(), self.score())],
            bbox: self.bounding_box(counter),
            id: String::new(),
        }
    }
}
