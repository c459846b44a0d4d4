pub mod config;
pub mod display;
pub mod pipeline;
pub mod playback;
pub mod rendering;
pub mod schedule;
pub mod shared;
pub mod video;
