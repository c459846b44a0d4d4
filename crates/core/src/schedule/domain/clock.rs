use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

/// Source of wall-clock time, monotonic time and blocking sleeps.
///
/// The playback loop never touches the system clock directly so that
/// scheduling and pacing can be driven by a fake in tests.
pub trait Clock: Send {
    /// Current local wall-clock time.
    fn now_local(&self) -> NaiveDateTime;

    /// Current monotonic instant.
    fn now_instant(&self) -> Instant;

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);

    /// Real time left until the local wall-clock time `target`, zero if
    /// it has passed. Clocks that know their time zone account for
    /// offset changes in between.
    fn duration_until(&self, target: NaiveDateTime) -> Duration {
        (target - self.now_local()).to_std().unwrap_or(Duration::ZERO)
    }
}
