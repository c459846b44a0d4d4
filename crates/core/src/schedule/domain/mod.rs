pub mod clock;
pub mod pacing_timer;
pub mod schedule_gate;
