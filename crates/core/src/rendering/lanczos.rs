//! Separable Lanczos3 resampling with precomputed filter taps.
//!
//! Follows the sampling geometry of `image::imageops::resize`: output
//! pixel centres map to `(i + 0.5) * ratio` in the source, and the kernel
//! widens by the ratio when downscaling. Taps and the intermediate buffer
//! are built once per source/target size pair.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

const SUPPORT: f64 = 3.0;

fn sinc(t: f64) -> f64 {
    if t == 0.0 {
        1.0
    } else {
        let a = t * std::f64::consts::PI;
        a.sin() / a
    }
}

fn lanczos3(x: f64) -> f64 {
    if x.abs() < SUPPORT {
        sinc(x) * sinc(x / SUPPORT)
    } else {
        0.0
    }
}

/// Normalized input weights for every output sample along one axis.
struct Taps {
    /// `(first input index, offset into weights, tap count)` per output.
    spans: Vec<(usize, usize, usize)>,
    weights: Vec<f64>,
}

impl Taps {
    fn new(src_len: usize, dst_len: usize) -> Self {
        let ratio = src_len as f64 / dst_len as f64;
        let scale = ratio.max(1.0);
        let support = SUPPORT * scale;
        let last = src_len as i64 - 1;

        let mut spans = Vec::with_capacity(dst_len);
        let mut weights = Vec::new();
        for out in 0..dst_len {
            let center = (out as f64 + 0.5) * ratio;
            let left = ((center - support).floor() as i64).clamp(0, last);
            let right = ((center + support).ceil() as i64).clamp(left + 1, src_len as i64);

            // Kernel origin sits on the pixel's left edge.
            let center = center - 0.5;
            let offset = weights.len();
            weights.extend((left..right).map(|i| lanczos3((i as f64 - center) / scale)));
            let sum: f64 = weights[offset..].iter().sum();
            if sum != 0.0 {
                weights[offset..].iter_mut().for_each(|w| *w /= sum);
            }
            spans.push((left as usize, offset, (right - left) as usize));
        }

        Self { spans, weights }
    }

    fn span(&self, out: usize) -> (usize, &[f64]) {
        let (start, offset, len) = self.spans[out];
        (start, &self.weights[offset..offset + len])
    }
}

/// Resamples 16-bit gray pictures of one fixed size to another.
pub struct Lanczos3 {
    source_size: (u32, u32),
    horizontal: Taps,
    vertical: Taps,
    /// Horizontally filtered rows: source height x target width.
    rows: Array2<f64>,
}

impl Lanczos3 {
    /// Sizes are `(width, height)`; all must be non-zero.
    pub fn new(source_size: (u32, u32), target_size: (u32, u32)) -> Self {
        let (src_w, src_h) = (source_size.0 as usize, source_size.1 as usize);
        let (dst_w, dst_h) = (target_size.0 as usize, target_size.1 as usize);
        Self {
            source_size,
            horizontal: Taps::new(src_w, dst_w),
            vertical: Taps::new(src_h, dst_h),
            rows: Array2::zeros((src_h, dst_w)),
        }
    }

    pub fn source_size(&self) -> (u32, u32) {
        self.source_size
    }

    /// Filters `src` (rows x columns) into `dst`, rounding and clamping to
    /// the 16-bit range. Shapes must match the sizes given to [`new`](Self::new).
    pub fn resample(&mut self, src: ArrayView2<u16>, mut dst: ArrayViewMut2<u16>) {
        debug_assert_eq!(src.dim(), (self.rows.nrows(), self.source_size.0 as usize));
        debug_assert_eq!(dst.ncols(), self.rows.ncols());

        for ((y, x), value) in self.rows.indexed_iter_mut() {
            let (start, weights) = self.horizontal.span(x);
            let row = src.row(y);
            *value = weights
                .iter()
                .enumerate()
                .map(|(k, w)| w * f64::from(row[start + k]))
                .sum();
        }

        let max = f64::from(u16::MAX);
        for ((y, x), value) in dst.indexed_iter_mut() {
            let (start, weights) = self.vertical.span(y);
            let column = self.rows.column(x);
            let sum: f64 = weights
                .iter()
                .enumerate()
                .map(|(k, w)| w * column[start + k])
                .sum();
            *value = sum.round().clamp(0.0, max) as u16;
        }
    }
}
