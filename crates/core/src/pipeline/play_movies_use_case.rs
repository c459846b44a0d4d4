use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::options::Options;
use crate::display::domain::display_sink::{DisplayError, DisplaySink};
use crate::playback::domain::playback_state::PlaybackState;
use crate::playback::domain::state_manager::{AdvanceError, PlaybackStateManager};
use crate::playback::domain::state_store::PersistenceError;
use crate::rendering::image_renderer::ImageRenderer;
use crate::schedule::domain::clock::Clock;
use crate::schedule::domain::pacing_timer::PacingTimer;
use crate::schedule::domain::schedule_gate::ScheduleGate;
use crate::video::domain::frame_decoder::VideoOpener;
use crate::video::domain::frame_source::FrameSource;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("No movie files found in {}", .0.display())]
    NoMovies(PathBuf),
    #[error(transparent)]
    State(#[from] AdvanceError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Plays the movie catalog forever, one presented frame at a time.
///
/// Resumes from the stored state, walks each file from the frame after
/// the last rendered one, and moves on to the next catalog entry at end
/// of file. Files that cannot be opened or decoded are skipped.
pub struct PlayMoviesUseCase {
    opener: Box<dyn VideoOpener>,
    display: Box<dyn DisplaySink>,
    clock: Box<dyn Clock>,
    state_manager: PlaybackStateManager,
    options: Options,
    panel_width: u32,
    panel_height: u32,
    gate: ScheduleGate,
    timer: PacingTimer,
}

impl PlayMoviesUseCase {
    pub fn new(
        opener: Box<dyn VideoOpener>,
        display: Box<dyn DisplaySink>,
        clock: Box<dyn Clock>,
        state_manager: PlaybackStateManager,
        options: Options,
        panel_width: u32,
        panel_height: u32,
    ) -> Self {
        let gate = ScheduleGate::new(options.schedule.clone());
        let timer = PacingTimer::new(Duration::from_secs(options.display_seconds), clock.as_ref());
        Self {
            opener,
            display,
            clock,
            state_manager,
            options,
            panel_width,
            panel_height,
            gate,
            timer,
        }
    }

    /// Stored resume point, or the first catalog entry on a fresh start.
    pub fn resume_point(&mut self) -> Result<Option<PlaybackState>, PlaybackError> {
        match self.state_manager.load_state()? {
            Some(state) => Ok(Some(state)),
            None => Ok(self.state_manager.advance()?),
        }
    }

    /// Plays `state.file` from `state.pts + 1` to its end.
    ///
    /// A file that cannot be opened, or whose frames stop being
    /// reachable, ends early without error so the caller can advance.
    pub fn play_file(&mut self, state: &mut PlaybackState) -> Result<(), PlaybackError> {
        let decoder = match self.opener.open(state.path()) {
            Ok(decoder) => decoder,
            Err(e) => {
                log::warn!("Skipping {}: {e}", state.path().display());
                return Ok(());
            }
        };
        let mut source = FrameSource::new(decoder);
        let mut renderer = match ImageRenderer::new(
            source.format(),
            &self.options,
            self.panel_width,
            self.panel_height,
        ) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::warn!("Skipping {}: {e}", state.path().display());
                return Ok(());
            }
        };

        log::info!("Writing file {} @{}", state.path().display(), state.pts + 1);

        let mut first_frame = true;
        let mut stride = 0;
        loop {
            let frame = match source.seek(state.pts + 1) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Stopping {}: {e}", state.path().display());
                    break;
                }
            };
            let pts = frame.pts();

            match renderer.try_render_non_empty(frame) {
                Ok(true) => {
                    stride += 1;
                    if stride == self.options.frame_skip {
                        self.pace(first_frame);
                        first_frame = false;
                        log::info!("Displaying frame {pts}");
                        self.display.present(renderer.result())?;
                        stride = 0;
                    }
                }
                Ok(false) => log::debug!("Skipping black frame {pts}"),
                Err(e) => log::warn!("Skipping frame {pts}: {e}"),
            }

            self.state_manager.record_progress(state, pts)?;
        }
        Ok(())
    }

    /// Plays `state` to the end and returns the next catalog entry.
    pub fn run_file(
        &mut self,
        mut state: PlaybackState,
    ) -> Result<Option<PlaybackState>, PlaybackError> {
        self.play_file(&mut state)?;
        Ok(self.state_manager.advance()?)
    }

    /// Plays until the catalog runs dry.
    ///
    /// Only returns on failure; an empty catalog is reported as
    /// [`PlaybackError::NoMovies`].
    pub fn run(&mut self) -> Result<(), PlaybackError> {
        let mut next = self.resume_point()?;
        while let Some(state) = next {
            next = self.run_file(state)?;
        }
        Err(PlaybackError::NoMovies(
            self.state_manager.media_dir().to_path_buf(),
        ))
    }

    /// Holds the next presentation until operating hours and until
    /// `display_seconds` have passed since the previous one. The first
    /// frame of a file only starts the pacing clock.
    fn pace(&mut self, first_frame: bool) {
        let clock = self.clock.as_ref();
        self.gate.wait_for_operating_hours(clock);
        if first_frame {
            self.timer.reset(clock);
        } else {
            self.timer.sleep_and_reset(clock);
        }
    }
}
