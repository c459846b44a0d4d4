use super::frame_decoder::{FrameDecoder, FrameSourceError};
use crate::shared::constants::{COARSE_SEEK_FRACTION, COARSE_SEEK_THRESHOLD};
use crate::shared::frame::Frame;
use crate::shared::video_format::VideoFormat;

/// Sequential, forward-seekable access to one video file.
///
/// Owns a single frame buffer that every retrieval overwrites; the
/// returned borrow ends before the next retrieval can start.
pub struct FrameSource {
    decoder: Box<dyn FrameDecoder>,
    format: VideoFormat,
    frame: Frame,
    has_frame: bool,
    exhausted: bool,
}

impl FrameSource {
    pub fn new(decoder: Box<dyn FrameDecoder>) -> Self {
        let format = decoder.format();
        Self {
            decoder,
            format,
            frame: Frame::empty(),
            has_frame: false,
            exhausted: false,
        }
    }

    pub fn format(&self) -> &VideoFormat {
        &self.format
    }

    /// Next decodable frame, or `None` at end of stream.
    pub fn next(&mut self) -> Result<Option<&Frame>, FrameSourceError> {
        if self.advance()? {
            Ok(Some(&self.frame))
        } else {
            Ok(None)
        }
    }

    /// First frame whose pts is at least `target_pts`.
    ///
    /// Returns the current frame again when it already satisfies the
    /// target, so repeated calls with non-decreasing targets never skip
    /// or rewind. Gaps above [`COARSE_SEEK_THRESHOLD`] first jump to
    /// [`COARSE_SEEK_FRACTION`] of the target, then walk forward. A failed
    /// jump is logged and the walk starts from the current frame.
    ///
    /// Fails with [`FrameSourceError::SeekFailure`] only when the stream
    /// has no first frame.
    pub fn seek(&mut self, target_pts: i64) -> Result<Option<&Frame>, FrameSourceError> {
        if !self.has_frame && !self.advance()? {
            return Err(FrameSourceError::SeekFailure(
                "cannot seek to first frame".to_string(),
            ));
        }

        if self.frame.pts() >= target_pts {
            return Ok(Some(&self.frame));
        }

        let delta = target_pts - self.frame.pts();
        if delta > COARSE_SEEK_THRESHOLD && !self.exhausted {
            log::info!("Seeking forward by {delta}, this might take a while");
            let hint = (target_pts as f64 * COARSE_SEEK_FRACTION) as i64;
            if let Err(e) = self.decoder.seek_hint(hint) {
                log::warn!("Coarse seek to {hint} failed, walking forward instead: {e}");
            }
        }

        while self.frame.pts() < target_pts {
            if !self.advance()? {
                return Ok(None);
            }
        }

        Ok(Some(&self.frame))
    }

    /// Decodes into the frame buffer, skipping undecodable units.
    fn advance(&mut self) -> Result<bool, FrameSourceError> {
        if self.exhausted {
            return Ok(false);
        }

        loop {
            match self.decoder.decode_next(&mut self.frame) {
                Ok(true) => {
                    self.has_frame = true;
                    return Ok(true);
                }
                Ok(false) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Err(FrameSourceError::Decode(reason)) => {
                    log::warn!("Skipping undecodable input: {reason}");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    enum Unit {
        Frame(i64),
        Corrupt,
    }

    struct StubDecoder {
        units: Vec<Unit>,
        cursor: usize,
        hints: Arc<Mutex<Vec<i64>>>,
        seekable: bool,
    }

    impl StubDecoder {
        fn with_pts(pts: impl IntoIterator<Item = i64>) -> Self {
            Self::with_units(pts.into_iter().map(Unit::Frame).collect())
        }

        fn with_units(units: Vec<Unit>) -> Self {
            Self {
                units,
                cursor: 0,
                hints: Arc::new(Mutex::new(Vec::new())),
                seekable: true,
            }
        }
    }

    impl FrameDecoder for StubDecoder {
        fn format(&self) -> VideoFormat {
            VideoFormat::new(4, 2, "gray16le")
        }

        fn decode_next(&mut self, frame: &mut Frame) -> Result<bool, FrameSourceError> {
            let Some(unit) = self.units.get(self.cursor) else {
                return Ok(false);
            };
            self.cursor += 1;
            match unit {
                Unit::Frame(pts) => {
                    frame.reshape(4, 2);
                    frame.set_pts(*pts);
                    Ok(true)
                }
                Unit::Corrupt => Err(FrameSourceError::Decode("corrupt packet".to_string())),
            }
        }

        /// Lands on the last frame at or before the hint, like a keyframe seek.
        fn seek_hint(&mut self, target_pts: i64) -> Result<(), FrameSourceError> {
            self.hints.lock().unwrap().push(target_pts);
            if !self.seekable {
                return Err(FrameSourceError::SeekFailure(
                    "container not seekable".to_string(),
                ));
            }
            self.cursor = self
                .units
                .iter()
                .rposition(|u| matches!(u, Unit::Frame(pts) if *pts <= target_pts))
                .unwrap_or(0);
            Ok(())
        }
    }

    fn source(decoder: StubDecoder) -> FrameSource {
        FrameSource::new(Box::new(decoder))
    }

    // --- Tests ---

    #[test]
    fn test_format_comes_from_decoder() {
        let s = source(StubDecoder::with_pts([0]));
        assert_eq!(s.format(), &VideoFormat::new(4, 2, "gray16le"));
    }

    #[test]
    fn test_next_yields_frames_then_end() {
        let mut s = source(StubDecoder::with_pts([0, 1, 2]));
        let mut seen = Vec::new();
        while let Some(frame) = s.next().unwrap() {
            seen.push(frame.pts());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(s.next().unwrap().is_none());
    }

    #[test]
    fn test_decode_errors_are_skipped() {
        let mut s = source(StubDecoder::with_units(vec![
            Unit::Frame(0),
            Unit::Corrupt,
            Unit::Corrupt,
            Unit::Frame(3),
        ]));
        assert_eq!(s.next().unwrap().unwrap().pts(), 0);
        assert_eq!(s.next().unwrap().unwrap().pts(), 3);
        assert!(s.next().unwrap().is_none());
    }

    #[test]
    fn test_seek_from_start_returns_first_frame() {
        let mut s = source(StubDecoder::with_pts([0, 1, 2]));
        assert_eq!(s.seek(0).unwrap().unwrap().pts(), 0);
    }

    #[test]
    fn test_seek_on_empty_stream_fails() {
        let mut s = source(StubDecoder::with_pts([]));
        assert!(matches!(s.seek(0), Err(FrameSourceError::SeekFailure(_))));
    }

    #[test]
    fn test_seek_lands_on_first_frame_at_or_after_target() {
        let mut s = source(StubDecoder::with_pts([0, 10, 20, 30]));
        assert_eq!(s.seek(15).unwrap().unwrap().pts(), 20);
    }

    #[test]
    fn test_seek_is_idempotent() {
        let mut s = source(StubDecoder::with_pts([0, 10, 20, 30]));
        assert_eq!(s.seek(15).unwrap().unwrap().pts(), 20);
        assert_eq!(s.seek(15).unwrap().unwrap().pts(), 20);
        assert_eq!(s.seek(20).unwrap().unwrap().pts(), 20);
    }

    #[test]
    fn test_seek_past_end_returns_none() {
        let mut s = source(StubDecoder::with_pts([0, 1, 2]));
        assert!(s.seek(100).unwrap().is_none());
        assert!(s.seek(101).unwrap().is_none());
    }

    #[test]
    fn test_non_decreasing_targets_give_monotonic_frames() {
        let pts: Vec<i64> = (0..200).map(|i| i * 3).collect();
        let mut s = source(StubDecoder::with_pts(pts));
        let mut last = i64::MIN;
        for target in [-1, 0, 0, 1, 2, 2, 50, 51, 300, 301, 597] {
            let frame_pts = s.seek(target).unwrap().unwrap().pts();
            assert!(frame_pts >= target, "pts {frame_pts} < target {target}");
            assert!(frame_pts >= last, "pts went backwards: {frame_pts} < {last}");
            last = frame_pts;
        }
    }

    #[test]
    fn test_playback_pattern_walks_every_frame() {
        let mut s = source(StubDecoder::with_pts([0, 1, 2, 3]));
        let mut pts = -1;
        let mut seen = Vec::new();
        while let Some(frame) = s.seek(pts + 1).unwrap() {
            pts = frame.pts();
            seen.push(pts);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_small_gap_does_not_coarse_seek() {
        let decoder = StubDecoder::with_pts((0..2000).step_by(10));
        let hints = decoder.hints.clone();
        let mut s = source(decoder);

        assert_eq!(s.seek(1000).unwrap().unwrap().pts(), 1000);
        assert!(hints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_large_gap_coarse_seeks_to_95_percent() {
        let decoder = StubDecoder::with_pts((0..5000).step_by(10));
        let hints = decoder.hints.clone();
        let mut s = source(decoder);

        assert_eq!(s.seek(4000).unwrap().unwrap().pts(), 4000);
        assert_eq!(*hints.lock().unwrap(), vec![3800]);
    }

    #[test]
    fn test_resume_deep_into_file() {
        let decoder = StubDecoder::with_pts((0..100_000).step_by(512));
        let hints = decoder.hints.clone();
        let mut s = source(decoder);

        let frame = s.seek(51_201).unwrap().unwrap();
        assert_eq!(frame.pts(), 51_712);
        assert_eq!(hints.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_coarse_seek_walks_forward() {
        let mut decoder = StubDecoder::with_pts(0..=5000);
        decoder.seekable = false;
        let hints = decoder.hints.clone();
        let mut s = source(decoder);

        assert_eq!(s.seek(3000).unwrap().unwrap().pts(), 3000);
        assert_eq!(*hints.lock().unwrap(), vec![2850]);
        assert_eq!(s.seek(3001).unwrap().unwrap().pts(), 3001);
    }
}
