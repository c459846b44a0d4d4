use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_format::VideoFormat;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    /// The file is unusable: unreadable, no video stream, or no decoder.
    #[error("cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    /// One unit of input could not be decoded; later input may still be fine.
    #[error("decode error: {0}")]
    Decode(String),
    /// No initial frame could be established, or the backend seek failed.
    #[error("seek failed: {0}")]
    SeekFailure(String),
}

/// Decodes frames from one opened video file.
///
/// Implementations handle container and codec details (packet routing,
/// decoder buffering, pixel conversion) while the frame source works with
/// plain [`Frame`]s.
pub trait FrameDecoder: Send {
    /// Format of the opened stream; stable for the decoder's lifetime.
    fn format(&self) -> VideoFormat;

    /// Decodes the next frame into `frame`, reusing its buffer.
    ///
    /// Returns `Ok(false)` at end of stream. A [`FrameSourceError::Decode`]
    /// covers only the unit that failed; the caller may keep decoding.
    fn decode_next(&mut self, frame: &mut Frame) -> Result<bool, FrameSourceError>;

    /// Best-effort jump to a keyframe at or before `target_pts`.
    fn seek_hint(&mut self, target_pts: i64) -> Result<(), FrameSourceError>;
}

/// Opens video files for decoding.
pub trait VideoOpener: Send {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameDecoder>, FrameSourceError>;
}
