use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::clock::Clock;
use crate::config::options::Schedule;

/// Today's operating window `[from, to)` for the day containing `now`.
pub fn operating_window(now: NaiveDateTime, schedule: &Schedule) -> (NaiveDateTime, NaiveDateTime) {
    let midnight = now.date().and_time(NaiveTime::default());
    let from = midnight + Duration::hours(i64::from(schedule.hour_from));
    let to = from + Duration::hours(i64::from(schedule.hours_for));
    (from, to)
}

/// Instant to sleep until before a frame may be presented, or `None`
/// if presenting is allowed right now.
///
/// Before today's window this is today's start; at or after today's end
/// it is always tomorrow's start.
pub fn sleep_target(now: NaiveDateTime, schedule: &Schedule) -> Option<NaiveDateTime> {
    if !schedule.enabled {
        return None;
    }

    let (from, to) = operating_window(now, schedule);
    if now < from {
        Some(from)
    } else if now >= to {
        Some(from + Duration::days(1))
    } else {
        None
    }
}

/// Blocks until the configured hours of operation.
///
/// Checked once per presented frame, so the window boundary is honoured
/// at presentation granularity only.
pub struct ScheduleGate {
    schedule: Schedule,
}

impl ScheduleGate {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    pub fn wait_for_operating_hours(&self, clock: &dyn Clock) {
        let now = clock.now_local();
        let Some(target) = sleep_target(now, &self.schedule) else {
            return;
        };

        let (from, to) = operating_window(now, &self.schedule);
        log::info!(
            "Hours of operation are {from} - {to}, current time is {now}, sleeping until {target}"
        );
        let duration = clock.duration_until(target);
        if !duration.is_zero() {
            clock.sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::domain::clock::fake::FakeClock;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn day_schedule() -> Schedule {
        Schedule {
            enabled: true,
            hour_from: 8,
            hours_for: 14,
        }
    }

    #[rstest]
    #[case::late_evening(at(19, 23, 0), Some(at(20, 8, 0)))]
    #[case::early_morning(at(19, 6, 0), Some(at(19, 8, 0)))]
    #[case::midday(at(19, 12, 0), None)]
    #[case::window_start_is_open(at(19, 8, 0), None)]
    #[case::window_end_is_closed(at(19, 22, 0), Some(at(20, 8, 0)))]
    #[case::just_before_end(at(19, 21, 59), None)]
    fn test_sleep_target(#[case] now: NaiveDateTime, #[case] expected: Option<NaiveDateTime>) {
        assert_eq!(sleep_target(now, &day_schedule()), expected);
    }

    #[test]
    fn test_disabled_schedule_never_blocks() {
        let schedule = Schedule {
            enabled: false,
            ..day_schedule()
        };
        assert_eq!(sleep_target(at(19, 3, 0), &schedule), None);
    }

    #[test]
    fn test_window_past_midnight_does_not_wrap() {
        // 20:00 for 8 hours; 01:00 is before today's start, not inside
        // yesterday's window.
        let schedule = Schedule {
            enabled: true,
            hour_from: 20,
            hours_for: 8,
        };
        assert_eq!(sleep_target(at(19, 1, 0), &schedule), Some(at(19, 20, 0)));
        assert_eq!(sleep_target(at(19, 23, 30), &schedule), None);
    }

    #[test]
    fn test_gate_sleeps_until_window_start() {
        let clock = FakeClock::at(at(19, 6, 30));
        ScheduleGate::new(day_schedule()).wait_for_operating_hours(&clock);

        assert_eq!(clock.sleeps(), vec![std::time::Duration::from_secs(90 * 60)]);
        assert_eq!(clock.now_local(), at(19, 8, 0));
    }

    #[test]
    fn test_gate_does_not_sleep_inside_window() {
        let clock = FakeClock::at(at(19, 12, 0));
        ScheduleGate::new(day_schedule()).wait_for_operating_hours(&clock);
        assert!(clock.sleeps().is_empty());
    }

    /// Reports an hour less until every target, as a clock would on the
    /// night clocks go forward.
    struct SpringForwardClock(FakeClock);

    impl Clock for SpringForwardClock {
        fn now_local(&self) -> NaiveDateTime {
            self.0.now_local()
        }

        fn now_instant(&self) -> std::time::Instant {
            self.0.now_instant()
        }

        fn sleep(&self, duration: std::time::Duration) {
            self.0.sleep(duration);
        }

        fn duration_until(&self, target: NaiveDateTime) -> std::time::Duration {
            self.0.duration_until(target) - std::time::Duration::from_secs(3600)
        }
    }

    #[test]
    fn test_gate_sleeps_for_real_time_until_window() {
        let fake = FakeClock::at(at(19, 0, 0));
        let clock = SpringForwardClock(fake.clone());
        ScheduleGate::new(day_schedule()).wait_for_operating_hours(&clock);

        assert_eq!(fake.sleeps(), vec![std::time::Duration::from_secs(7 * 3600)]);
    }
}
