use std::path::Path;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::{rescale, Rational, Rescale};

use crate::shared::frame::Frame;
use crate::shared::video_format::VideoFormat;
use crate::video::domain::frame_decoder::{FrameDecoder, FrameSourceError, VideoOpener};

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded picture to 16-bit gray with swscale and copies it
/// into the caller's [`Frame`].
pub struct FfmpegDecoder {
    input_ctx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<scaling::Context>,
    video_stream_index: usize,
    time_base: Rational,
    format: VideoFormat,
    decoded: Video,
    gray: Video,
    last_pts: i64,
    input_done: bool,
}

// Safety: FfmpegDecoder is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegDecoder {}

impl FfmpegDecoder {
    pub fn open(path: &Path) -> Result<Self, FrameSourceError> {
        let open_error = |reason: String| FrameSourceError::Open {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| open_error(e.to_string()))?;
        let input_ctx = ffmpeg_next::format::input(path).map_err(|e| open_error(e.to_string()))?;

        let (video_stream_index, time_base, decoder) = {
            let stream = input_ctx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or_else(|| open_error("no video stream found".to_string()))?;
            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                    .map_err(|e| open_error(e.to_string()))?;
            let decoder = codec_ctx
                .decoder()
                .video()
                .map_err(|e| open_error(e.to_string()))?;
            (stream.index(), stream.time_base(), decoder)
        };

        let pixel_format = decoder
            .format()
            .descriptor()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let format = VideoFormat::new(decoder.width(), decoder.height(), pixel_format);
        if format.width == 0 || format.height == 0 {
            return Err(open_error("video stream has no dimensions".to_string()));
        }

        Ok(Self {
            input_ctx,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            format,
            decoded: Video::empty(),
            gray: Video::empty(),
            last_pts: -1,
            input_done: false,
        })
    }

    /// Sends the next video packet to the decoder, or end-of-file once the
    /// container runs dry. Packets of other streams are skipped.
    fn feed(&mut self) -> Result<(), FrameSourceError> {
        loop {
            let next = self
                .input_ctx
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));

            let Some((index, packet)) = next else {
                if let Err(e) = self.decoder.send_eof() {
                    log::debug!("Decoder rejected end of input: {e}");
                }
                self.input_done = true;
                return Ok(());
            };

            if index != self.video_stream_index {
                continue;
            }

            return self
                .decoder
                .send_packet(&packet)
                .map_err(|e| FrameSourceError::Decode(format!("error decoding packet: {e}")));
        }
    }

    /// Converts the last decoded picture into `frame`.
    fn convert(&mut self, frame: &mut Frame) -> Result<(), FrameSourceError> {
        let (src_format, width, height) = (
            self.decoded.format(),
            self.decoded.width(),
            self.decoded.height(),
        );

        let stale = self.scaler.as_ref().map_or(true, |s| {
            let input = s.input();
            input.format != src_format || input.width != width || input.height != height
        });
        if stale {
            let scaler = scaling::Context::get(
                src_format,
                width,
                height,
                Pixel::GRAY16LE,
                width,
                height,
                scaling::Flags::BILINEAR | scaling::Flags::ACCURATE_RND,
            )
            .map_err(|e| FrameSourceError::Decode(format!("cannot convert {src_format:?}: {e}")))?;
            self.scaler = Some(scaler);
            self.gray = Video::empty();
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler
                .run(&self.decoded, &mut self.gray)
                .map_err(|e| FrameSourceError::Decode(format!("cannot convert frame: {e}")))?;
        }

        frame.reshape(width, height);
        extract_gray16_samples(&self.gray, width, frame.data_mut());

        let pts = self
            .decoded
            .timestamp()
            .or_else(|| self.decoded.pts())
            .unwrap_or(self.last_pts + 1);
        self.last_pts = pts;
        frame.set_pts(pts);
        Ok(())
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn format(&self) -> VideoFormat {
        self.format.clone()
    }

    fn decode_next(&mut self, frame: &mut Frame) -> Result<bool, FrameSourceError> {
        loop {
            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => {
                    self.convert(frame)?;
                    return Ok(true);
                }
                Err(ffmpeg_next::Error::Eof) => return Ok(false),
                // No output yet: the decoder needs more input.
                Err(ffmpeg_next::Error::Other {
                    errno: ffmpeg_next::error::EAGAIN,
                }) => {}
                Err(e) if self.input_done => {
                    log::warn!("Decoder failed after end of input: {e}");
                    return Ok(false);
                }
                // Move past the bad unit so the next call makes progress.
                Err(e) => {
                    if let Err(feed_err) = self.feed() {
                        log::debug!("Feeding after decode failure: {feed_err}");
                    }
                    return Err(FrameSourceError::Decode(e.to_string()));
                }
            }

            if self.input_done {
                return Ok(false);
            }
            self.feed()?;
        }
    }

    fn seek_hint(&mut self, target_pts: i64) -> Result<(), FrameSourceError> {
        let ts = target_pts.rescale(self.time_base, rescale::TIME_BASE);
        self.input_ctx
            .seek(ts, ..ts)
            .map_err(|e| FrameSourceError::SeekFailure(format!("seek to {target_pts}: {e}")))?;
        self.decoder.flush();
        self.input_done = false;
        Ok(())
    }
}

/// Opens files with [`FfmpegDecoder`].
pub struct FfmpegOpener;

impl FfmpegOpener {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameDecoder>, FrameSourceError> {
        Ok(Box::new(FfmpegDecoder::open(path)?))
    }
}

/// Copies little-endian 16-bit samples out of an ffmpeg frame.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width * 2); those are skipped.
fn extract_gray16_samples(gray: &Video, width: u32, out: &mut [u16]) {
    let stride = gray.stride(0);
    let data = gray.data(0);
    let w = width as usize;
    if w == 0 {
        return;
    }

    for (row, samples) in out.chunks_exact_mut(w).enumerate() {
        let row_bytes = &data[row * stride..row * stride + w * 2];
        for (sample, bytes) in samples.iter_mut().zip(row_bytes.chunks_exact(2)) {
            *sample = u16::from_le_bytes([bytes[0], bytes[1]]);
        }
    }
}
