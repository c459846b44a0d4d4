use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use super::dither::{floyd_steinberg, pack_bits, packed_len};
use super::fit_transform::FitTransform;
use super::lanczos::Lanczos3;
use crate::config::options::Options;
use crate::shared::frame::Frame;
use crate::shared::video_format::VideoFormat;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot render a {width}x{height} source")]
    InvalidSource { width: u32, height: u32 },
    #[error("frame buffer does not hold a {width}x{height} picture")]
    FrameSize { width: u32, height: u32 },
}

/// Turns decoded frames into packed 1bpp panel bitmaps.
///
/// Built once per opened file: the fit transform, the resampler taps,
/// the scaled picture, the panel-sized luminance plane and the output
/// bit buffer are sized here and reused for every frame of that file.
pub struct ImageRenderer {
    transform: FitTransform,
    resampler: Lanczos3,
    scaled: Array2<u16>,
    plane: Array2<f64>,
    result: Vec<u8>,
}

impl ImageRenderer {
    pub fn new(
        format: &VideoFormat,
        options: &Options,
        panel_width: u32,
        panel_height: u32,
    ) -> Result<Self, RenderError> {
        if format.width == 0 || format.height == 0 {
            return Err(RenderError::InvalidSource {
                width: format.width,
                height: format.height,
            });
        }

        let transform = FitTransform::compute(format, options, panel_width, panel_height);
        let pixels = (panel_width as usize) * (panel_height as usize);

        Ok(Self {
            transform,
            resampler: Lanczos3::new(
                (format.width, format.height),
                (transform.scaled_width, transform.scaled_height),
            ),
            scaled: Array2::zeros((
                transform.scaled_height as usize,
                transform.scaled_width as usize,
            )),
            plane: Array2::zeros((panel_height as usize, panel_width as usize)),
            result: vec![0; packed_len(pixels)],
        })
    }

    pub fn transform(&self) -> &FitTransform {
        &self.transform
    }

    /// Packed bitmap of the last non-black frame, row-major, MSB first,
    /// 1 = bright (luminance above the dither threshold). Sinks own the
    /// panel polarity.
    pub fn result(&self) -> &[u8] {
        &self.result
    }

    /// Renders `frame` into [`result`](Self::result).
    ///
    /// Returns `Ok(false)` without touching the result when the scaled
    /// picture is entirely black.
    pub fn try_render_non_empty(&mut self, frame: &Frame) -> Result<bool, RenderError> {
        let frame_size_error = || RenderError::FrameSize {
            width: frame.width(),
            height: frame.height(),
        };
        if frame.width() == 0 || frame.height() == 0 {
            return Err(frame_size_error());
        }
        let source = ArrayView2::from_shape(
            (frame.height() as usize, frame.width() as usize),
            frame.data(),
        )
        .map_err(|_| frame_size_error())?;

        let source_size = (frame.width(), frame.height());
        if self.resampler.source_size() != source_size {
            log::debug!("Source size changed to {}x{}", source_size.0, source_size.1);
            self.resampler = Lanczos3::new(
                source_size,
                (self.transform.scaled_width, self.transform.scaled_height),
            );
        }
        self.resampler.resample(source, self.scaled.view_mut());

        if self.scaled.iter().all(|&s| s == 0) {
            return Ok(false);
        }

        self.compose();
        floyd_steinberg(&mut self.plane);
        pack_bits(&self.plane, &mut self.result);
        Ok(true)
    }

    /// Writes the scaled picture into the panel plane at the fit offset,
    /// normalized to `[0, 1]`; everything outside it becomes background.
    fn compose(&mut self) {
        let FitTransform {
            offset_x,
            offset_y,
            ..
        } = self.transform;
        let max = f64::from(u16::MAX);

        self.plane.fill(0.0);
        for ((sy, sx), &sample) in self.scaled.indexed_iter() {
            let (Ok(y), Ok(x)) = (
                usize::try_from(sy as i64 + offset_y),
                usize::try_from(sx as i64 + offset_x),
            ) else {
                continue;
            };
            if let Some(value) = self.plane.get_mut((y, x)) {
                *value = f64::from(sample) / max;
            }
        }
    }
}
