use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config_store::ConfigError;
use crate::shared::constants::DEFAULT_MOVIES_DIR_NAME;

/// Daily operating-hours window, in local time.
///
/// The window is `[hour_from, hour_from + hours_for)` measured from the
/// current day's midnight. It never wraps past the next midnight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    pub enabled: bool,
    pub hour_from: u32,
    pub hours_for: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            enabled: false,
            hour_from: 8,
            hours_for: 14,
        }
    }
}

/// Playback options, loaded once per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Directory holding the movie files.
    pub path: PathBuf,
    /// Visible region of the panel.
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    /// Present every Nth non-black frame.
    pub frame_skip: u32,
    pub display_seconds: u64,
    pub schedule: Schedule,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MOVIES_DIR_NAME),
            width: 800,
            height: 480,
            offset_x: 0,
            offset_y: 0,
            frame_skip: 1,
            display_seconds: 120,
            schedule: Schedule::default(),
        }
    }
}

impl Options {
    /// Checks the options against a panel of `panel_width` x `panel_height`.
    pub fn validate(&self, panel_width: u32, panel_height: u32) -> Result<(), ConfigError> {
        if self.width == 0 || u64::from(self.offset_x) + u64::from(self.width) > u64::from(panel_width)
        {
            return Err(ConfigError::Invalid(format!(
                "invalid width: offsetX {} + width {} must be within 1..={panel_width}",
                self.offset_x, self.width
            )));
        }
        if self.height == 0
            || u64::from(self.offset_y) + u64::from(self.height) > u64::from(panel_height)
        {
            return Err(ConfigError::Invalid(format!(
                "invalid height: offsetY {} + height {} must be within 1..={panel_height}",
                self.offset_y, self.height
            )));
        }
        if self.frame_skip == 0 {
            return Err(ConfigError::Invalid(
                "frameSkip must be a positive integer".to_string(),
            ));
        }
        if self.display_seconds == 0 {
            return Err(ConfigError::Invalid(
                "displaySeconds must be a positive integer".to_string(),
            ));
        }
        if self.schedule.hour_from >= 24 {
            return Err(ConfigError::Invalid(format!(
                "schedule.hourFrom must be between 0 and 23, got {}",
                self.schedule.hour_from
            )));
        }
        if self.schedule.hours_for == 0 {
            return Err(ConfigError::Invalid(
                "schedule.hoursFor must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
