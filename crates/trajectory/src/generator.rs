//! DetectionGenerator - timer callback body
//!
//! Owns the simulation counter. The driving task calls [`tick`] once per
//! timer period; everything else is a pure function of the counter.
//!
//! [`tick`]: DetectionGenerator::tick

use contracts::{Clock, Detection3DArray, Header, Transport, DEFAULT_FRAME_ID};
use tracing::{debug, trace};

use crate::agent::Agent;
use crate::clock::SimulationClock;

/// Produces one `[human, AMR]` detection batch per published tick
#[derive(Debug, Clone)]
pub struct DetectionGenerator {
    clock: SimulationClock,
    frame_id: String,
}

impl DetectionGenerator {
    /// Create a generator at counter 0
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self::with_clock(frame_id, SimulationClock::new())
    }

    /// Create a generator resuming from a given counter
    pub fn with_clock(frame_id: impl Into<String>, clock: SimulationClock) -> Self {
        Self {
            clock,
            frame_id: frame_id.into(),
        }
    }

    /// Current counter value
    pub fn counter(&self) -> u32 {
        self.clock.value()
    }

    /// Reference frame stamped on every header
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Header for a batch created now
    pub fn header<C: Clock + ?Sized>(&self, clock: &C) -> Header {
        Header {
            stamp: clock.now(),
            frame_id: self.frame_id.clone(),
        }
    }

    /// Batch for a counter value, without touching any state
    pub fn batch_at(&self, counter: u32, header: Header) -> Detection3DArray {
        let detections = Agent::ALL
            .iter()
            .map(|agent| agent.detect(counter, &header))
            .collect();

        Detection3DArray { header, detections }
    }

    /// Run one timer tick
    ///
    /// Does nothing (and leaves the counter untouched) while the topic has
    /// no subscribers. Otherwise publishes the batch for the current
    /// counter and advances it. Returns the published batch.
    pub fn tick<T, C>(&mut self, transport: &T, clock: &C) -> Option<Detection3DArray>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        if transport.subscriber_count() == 0 {
            trace!(topic = transport.topic(), "No subscribers, tick skipped");
            return None;
        }

        let header = self.header(clock);

        if self.clock.wrap() {
            debug!(topic = transport.topic(), "Patrol cycle complete, counter reset");
        }

        let counter = self.clock.value();
        let batch = self.batch_at(counter, header);

        trace!(
            counter,
            detections = batch.detections.len(),
            "Publishing detection batch"
        );
        transport.publish(batch.clone());
        self.clock.advance();

        Some(batch)
    }
}

impl Default for DetectionGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::CYCLE_TICKS;
    use contracts::{SteppedClock, Time};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport double recording every published batch
    struct RecordingTransport {
        subscribers: AtomicUsize,
        published: Mutex<Vec<Detection3DArray>>,
    }

    impl RecordingTransport {
        fn with_subscribers(count: usize) -> Self {
            Self {
                subscribers: AtomicUsize::new(count),
                published: Mutex::new(Vec::new()),
            }
        }

        fn published(&self) -> Vec<Detection3DArray> {
            self.published.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn topic(&self) -> &str {
            "detection3_d_array"
        }

        fn subscriber_count(&self) -> usize {
            self.subscribers.load(Ordering::Relaxed)
        }

        fn publish(&self, batch: Detection3DArray) {
            self.published.lock().unwrap().push(batch);
        }
    }

    fn position(batch: &Detection3DArray, idx: usize) -> (f64, f64, f64) {
        let p = batch.detections[idx].bbox.center.position;
        (p.x, p.y, p.z)
    }

    fn assert_close(actual: (f64, f64, f64), expected: (f64, f64, f64)) {
        let eps = 1e-9;
        assert!(
            (actual.0 - expected.0).abs() < eps
                && (actual.1 - expected.1).abs() < eps
                && (actual.2 - expected.2).abs() < eps,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_tick_without_subscribers_is_noop() {
        let transport = RecordingTransport::with_subscribers(0);
        let clock = SteppedClock::frozen(Time::new(1, 0));
        let mut generator = DetectionGenerator::default();

        assert!(generator.tick(&transport, &clock).is_none());
        assert_eq!(generator.counter(), 0);
        assert!(transport.published().is_empty());
    }

    #[test]
    fn test_tick_publishes_and_advances() {
        let transport = RecordingTransport::with_subscribers(1);
        let clock = SteppedClock::frozen(Time::new(42, 7));
        let mut generator = DetectionGenerator::default();

        let batch = generator.tick(&transport, &clock).unwrap();
        assert_eq!(generator.counter(), 1);

        let published = transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0], batch);

        assert_eq!(batch.header.frame_id, "map");
        assert_eq!(batch.header.stamp, Time::new(42, 7));
        assert_eq!(batch.detections.len(), 2);
        for detection in &batch.detections {
            assert_eq!(detection.header, batch.header);
        }
        assert_eq!(batch.detections[0].label(), Some("human"));
        assert_eq!(batch.detections[1].label(), Some("AMR"));
    }

    #[test]
    fn test_reference_scenarios() {
        let transport = RecordingTransport::with_subscribers(1);
        let clock = SteppedClock::frozen(Time::default());

        let cases = [
            (0, (0.0, 0.0, 0.95), (-1.0, -3.0, 0.4)),
            (49, (4.9, 0.0, 0.95), (8.8, -3.0, 0.4)),
            (150, (0.0, 5.0, 0.95), (-1.0, 7.0, 0.4)),
            (199, (0.0, 0.1, 0.95), (-1.0, -2.8, 0.4)),
        ];

        for (counter, human, amr) in cases {
            let mut generator =
                DetectionGenerator::with_clock("map", SimulationClock::starting_at(counter));
            let batch = generator.tick(&transport, &clock).unwrap();
            assert_close(position(&batch, 0), human);
            assert_close(position(&batch, 1), amr);
        }
    }

    #[test]
    fn test_counter_wraps_after_full_cycle() {
        let transport = RecordingTransport::with_subscribers(1);
        let clock = SteppedClock::new(Time::default(), 100_000_000);
        let mut generator = DetectionGenerator::default();

        for _ in 0..CYCLE_TICKS {
            generator.tick(&transport, &clock).unwrap();
        }
        assert_eq!(generator.counter(), CYCLE_TICKS);

        let first = transport.published()[0].clone();
        let wrapped = generator.tick(&transport, &clock).unwrap();
        assert_eq!(generator.counter(), 1);
        assert_eq!(wrapped.detections[0].bbox, first.detections[0].bbox);
        assert_eq!(wrapped.detections[1].bbox, first.detections[1].bbox);
    }

    #[test]
    fn test_resumes_after_subscriber_returns() {
        let transport = RecordingTransport::with_subscribers(1);
        let clock = SteppedClock::frozen(Time::default());
        let mut generator = DetectionGenerator::default();

        generator.tick(&transport, &clock);
        generator.tick(&transport, &clock);
        transport.subscribers.store(0, Ordering::Relaxed);
        for _ in 0..5 {
            assert!(generator.tick(&transport, &clock).is_none());
        }
        transport.subscribers.store(2, Ordering::Relaxed);
        generator.tick(&transport, &clock);

        assert_eq!(generator.counter(), 3);
        assert_eq!(transport.published().len(), 3);
    }

    #[test]
    fn test_batch_at_matches_agents_for_every_counter() {
        let generator = DetectionGenerator::default();
        for counter in 0..CYCLE_TICKS {
            let batch = generator.batch_at(counter, Header::default());
            assert_eq!(batch.detections.len(), 2);
            for (detection, agent) in batch.detections.iter().zip(Agent::ALL) {
                let (x, y) = agent.position(counter);
                let p = detection.bbox.center.position;
                assert_eq!((p.x, p.y), (x, y));
                assert_eq!(p.z, detection.bbox.size.z / 2.0);
                assert!(detection.bbox.center.orientation.is_identity());
                assert_eq!(detection.results.len(), 1);
                assert_eq!(detection.results[0].hypothesis.class_id, agent.label());
                assert_eq!(detection.results[0].hypothesis.score, agent.score());
            }
        }
    }
}
