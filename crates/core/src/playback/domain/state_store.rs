use std::path::PathBuf;

use thiserror::Error;

use super::playback_state::PlaybackState;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("cannot read state from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable storage for the resume point.
///
/// `save` replaces the stored state as a whole; a reader never sees a
/// partially written state.
pub trait StateStore: Send {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PlaybackState>, PersistenceError>;

    fn save(&mut self, state: &PlaybackState) -> Result<(), PersistenceError>;
}
