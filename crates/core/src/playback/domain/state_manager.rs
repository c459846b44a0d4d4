use std::path::{Path, PathBuf};

use thiserror::Error;

use super::catalog::{self, CatalogError};
use super::playback_state::PlaybackState;
use super::state_store::{PersistenceError, StateStore};
use crate::shared::constants::PERSIST_EVERY;

#[derive(Error, Debug)]
pub enum AdvanceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Owns the durable resume point and decides which movie plays next.
pub struct PlaybackStateManager {
    store: Box<dyn StateStore>,
    media_dir: PathBuf,
    unsynced_updates: u32,
}

impl PlaybackStateManager {
    pub fn new(store: Box<dyn StateStore>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            media_dir: media_dir.into(),
            unsynced_updates: 0,
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Stored resume point, if any.
    ///
    /// A corrupt state file is logged and treated as a fresh start.
    pub fn load_state(&self) -> Result<Option<PlaybackState>, PersistenceError> {
        match self.store.load() {
            Err(PersistenceError::Corrupt { path, source }) => {
                log::warn!("Ignoring corrupt state file {}: {source}", path.display());
                Ok(None)
            }
            other => other,
        }
    }

    /// Moves to the movie after the stored one, wrapping to the first.
    ///
    /// Falls back to the first movie when nothing is stored or the stored
    /// movie is no longer in the catalog. Returns `None` only when the
    /// catalog is empty. A returned state has already been persisted.
    pub fn advance(&mut self) -> Result<Option<PlaybackState>, AdvanceError> {
        let names = catalog::scan(&self.media_dir)?;
        let current = self.load_state()?;

        let next_name = current
            .as_ref()
            .and_then(|state| state.file_name())
            .and_then(|name| names.iter().position(|n| n == name))
            .and_then(|index| names.get(index + 1))
            .or_else(|| names.first());

        let Some(name) = next_name else {
            return Ok(None);
        };

        let state = PlaybackState::start_of(self.media_dir.join(name));
        self.store.save(&state)?;
        self.unsynced_updates = 0;
        Ok(Some(state))
    }

    /// Records the pts of the last rendered frame.
    ///
    /// Only every [`PERSIST_EVERY`]th call reaches the store, bounding
    /// writes while losing at most that many frames on power loss.
    pub fn record_progress(
        &mut self,
        state: &mut PlaybackState,
        pts: i64,
    ) -> Result<(), PersistenceError> {
        state.pts = pts;

        self.unsynced_updates += 1;
        if self.unsynced_updates % PERSIST_EVERY == 0 {
            self.unsynced_updates = 0;
            self.store.save(state)?;
        }
        Ok(())
    }
}
