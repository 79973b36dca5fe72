//! Wall-clock sources consulted by the simulation step.

use std::{cell::Cell, fmt, rc::Rc, time::Duration, time::Instant};

use crate::Timestamp;

/// Source of wall-clock readings.
///
/// The simulation reads the clock once per step and never assumes a fixed
/// tick interval, so dropped frames do not distort timed rules.
pub trait Clock: fmt::Debug {
    /// Current reading relative to the clock's origin.
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by [`Instant`], with its origin at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_elapsed(self.origin.elapsed())
    }
}

/// Hand-driven clock for deterministic tests.
///
/// Clones share the same reading, so a test can keep one handle while the
/// simulation owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock that reads [`Timestamp::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the shared reading forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_add(delta));
    }

    /// Replaces the shared reading.
    pub fn set(&self, now: Timestamp) {
        self.elapsed.set(now.elapsed());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_elapsed(self.elapsed.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(16));
        handle.advance(Duration::from_millis(17));

        assert_eq!(clock.now(), Timestamp::from_millis(33));
    }

    #[test]
    fn system_clock_never_runs_backwards() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
