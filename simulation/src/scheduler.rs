use std::time::Duration;

use log::debug;

/// Target spacing between simulation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Most ticks a single frame may run before the backlog is dropped.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// Converts variable frame durations into whole fixed-cadence ticks.
///
/// The scheduler only decides how often to step; the simulation still reads
/// its clock for every timing rule, so dropped ticks never distort the dwell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickScheduler {
    interval: Duration,
    max_ticks: u32,
    accumulator: Duration,
}

impl TickScheduler {
    /// Creates a scheduler with the provided cadence and per-frame cap.
    ///
    /// A zero interval is raised to one millisecond and a zero cap to one tick.
    #[must_use]
    pub fn new(interval: Duration, max_ticks: u32) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            max_ticks: max_ticks.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Spacing between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub const fn backlog(&self) -> Duration {
        self.accumulator
    }

    /// Adds a frame's duration and returns how many ticks should run now.
    pub fn advance(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;

        let mut ticks = 0;
        while self.accumulator >= self.interval && ticks < self.max_ticks {
            self.accumulator -= self.interval;
            ticks += 1;
        }

        if self.accumulator >= self.interval {
            debug!(
                "dropping {:?} of tick backlog after {ticks} ticks",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        ticks
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(TICK_INTERVAL, MAX_TICKS_PER_FRAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_accumulate_into_one_tick() {
        let mut scheduler = TickScheduler::default();

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
        assert_eq!(scheduler.backlog(), Duration::from_millis(4));
    }

    #[test]
    fn regular_frames_yield_one_tick_each() {
        let mut scheduler = TickScheduler::default();

        for _ in 0..10 {
            assert_eq!(scheduler.advance(TICK_INTERVAL), 1);
        }
        assert_eq!(scheduler.backlog(), Duration::ZERO);
    }

    #[test]
    fn stall_is_capped_and_backlog_dropped() {
        let mut scheduler = TickScheduler::default();

        assert_eq!(
            scheduler.advance(Duration::from_secs(2)),
            MAX_TICKS_PER_FRAME
        );
        assert_eq!(scheduler.backlog(), Duration::ZERO);
        assert_eq!(scheduler.advance(Duration::from_millis(5)), 0);
    }

    #[test]
    fn degenerate_settings_are_raised() {
        let scheduler = TickScheduler::new(Duration::ZERO, 0);

        assert_eq!(scheduler.interval(), Duration::from_millis(1));
        let mut scheduler = scheduler;
        assert_eq!(scheduler.advance(Duration::from_millis(3)), 1);
    }
}
