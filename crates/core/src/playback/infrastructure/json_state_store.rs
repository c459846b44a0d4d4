use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::playback::domain::playback_state::PlaybackState;
use crate::playback::domain::state_store::{PersistenceError, StateStore};

/// Stores the resume point as `{"file": ..., "pts": ...}` in a JSON file.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<PlaybackState>, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| PersistenceError::Corrupt {
                path: self.path.clone(),
                source: e,
            })
    }

    fn save(&mut self, state: &PlaybackState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(state).map_err(PersistenceError::Serialize)?;

        // Write to a temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("part");
        let write_error = |e| PersistenceError::Write {
            path: temp_path.clone(),
            source: e,
        };
        let mut file = fs::File::create(&temp_path).map_err(write_error)?;
        writeln!(file, "{json}").map_err(write_error)?;
        file.sync_all().map_err(write_error)?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}
