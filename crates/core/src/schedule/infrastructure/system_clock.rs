use std::time::{Duration, Instant};

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};

use crate::schedule::domain::clock::Clock;

/// Real time: `chrono::Local` for wall-clock, `std::thread::sleep` for waits.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_instant(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn duration_until(&self, target: NaiveDateTime) -> Duration {
        wall_clock_duration(&Local::now(), target)
    }
}

/// Real time from `now` until the wall clock of `now`'s zone reads
/// `target`.
///
/// An ambiguous target (clocks turned back) resolves to its first
/// occurrence. A target skipped by clocks turning forward resolves to the
/// same reading one hour later.
fn wall_clock_duration<Tz: TimeZone>(now: &DateTime<Tz>, target: NaiveDateTime) -> Duration {
    let tz = now.timezone();
    let resolved = match tz.from_local_datetime(&target) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(target + chrono::Duration::hours(1)))
            .earliest(),
    };

    let delta = match resolved {
        Some(at) => at.naive_utc() - now.naive_utc(),
        None => {
            log::warn!("Cannot place {target} in the local time zone, ignoring offset changes");
            target - now.naive_local()
        }
    };
    delta.to_std().unwrap_or(Duration::ZERO)
}
