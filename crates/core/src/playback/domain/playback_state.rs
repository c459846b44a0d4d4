use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// pts of a file whose first frame has not been shown yet.
pub const NOT_STARTED: i64 = -1;

/// Resume point: which movie is playing and the pts of the last
/// rendered frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub file: PathBuf,
    pub pts: i64,
}

impl PlaybackState {
    pub fn new(file: impl Into<PathBuf>, pts: i64) -> Self {
        Self {
            file: file.into(),
            pts,
        }
    }

    /// The beginning of `file`.
    pub fn start_of(file: impl Into<PathBuf>) -> Self {
        Self::new(file, NOT_STARTED)
    }

    /// Catalog name of the current file.
    pub fn file_name(&self) -> Option<&str> {
        self.file.file_name().and_then(|n| n.to_str())
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}
