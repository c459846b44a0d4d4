use std::time::{Duration, Instant};

use super::clock::Clock;

/// Keeps presented frames roughly `delay` apart in real time.
///
/// Decode, render and schedule-gate time since the last reset is
/// absorbed into the wait instead of adding to it.
pub struct PacingTimer {
    delay: Duration,
    reference: Instant,
}

impl PacingTimer {
    pub fn new(delay: Duration, clock: &dyn Clock) -> Self {
        Self {
            delay,
            reference: clock.now_instant(),
        }
    }

    pub fn reset(&mut self, clock: &dyn Clock) {
        self.reference = clock.now_instant();
    }

    pub fn sleep_and_reset(&mut self, clock: &dyn Clock) {
        let elapsed = clock.now_instant().saturating_duration_since(self.reference);
        if let Some(remaining) = self.delay.checked_sub(elapsed) {
            if !remaining.is_zero() {
                clock.sleep(remaining);
            }
        }
        self.reset(clock);
    }
}
