use std::time::Duration;

use tokio::time::Instant;

/// Fixed-rate tick cadence.
///
/// A tick is due `interval` after the previous one started, so time spent
/// inside a tick is absorbed instead of accumulating as drift. Ticks never
/// overlap: an overrun tick is followed immediately by the next one.
#[derive(Debug, Clone, Copy)]
pub struct TickSchedule {
    interval: Duration,
}

impl TickSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the tick after the one that ran from `started` to `finished`
    /// should start, and whether that tick overran its slot.
    pub fn deadline_after(&self, started: Instant, finished: Instant) -> (Instant, bool) {
        let due = started + self.interval;
        if finished > due {
            (finished, true)
        } else {
            (due, false)
        }
    }
}
