//! 1-bit quantization of a luminance plane.
//!
//! Floyd–Steinberg error diffusion
//! (<https://en.wikipedia.org/wiki/Floyd%E2%80%93Steinberg_dithering>)
//! followed by MSB-first bit packing. Both passes are deterministic: the
//! exact output bits for a given plane are part of the contract.

use ndarray::Array2;

/// Samples strictly above this quantize to 1 (bright).
pub const THRESHOLD: f64 = 0.5;

/// Bytes needed to hold one bit per pixel.
pub fn packed_len(pixels: usize) -> usize {
    pixels.div_ceil(8)
}

/// Quantizes `plane` (values nominally in `[0, 1]`) to `{0, 1}` in place.
///
/// Scans row-major and pushes each pixel's quantization error onto the
/// unvisited neighbours: 7/16 right, 3/16 below-left, 5/16 below,
/// 1/16 below-right. Neighbours outside the plane are skipped.
pub fn floyd_steinberg(plane: &mut Array2<f64>) {
    let (rows, cols) = plane.dim();
    for y in 0..rows {
        for x in 0..cols {
            let old = plane[[y, x]];
            let new = if old > THRESHOLD { 1.0 } else { 0.0 };
            plane[[y, x]] = new;
            let error = old - new;

            if x + 1 < cols {
                plane[[y, x + 1]] += error * 7.0 / 16.0;
            }

            if y + 1 < rows {
                if x > 0 {
                    plane[[y + 1, x - 1]] += error * 3.0 / 16.0;
                }
                plane[[y + 1, x]] += error * 5.0 / 16.0;
                if x + 1 < cols {
                    plane[[y + 1, x + 1]] += error / 16.0;
                }
            }
        }
    }
}

/// Packs `plane` into `out`, one bit per sample in row-major order.
///
/// Sample `i` maps to bit `7 - i % 8` of byte `i / 8`; the bit is set
/// when the sample is above [`THRESHOLD`] and cleared otherwise, so every
/// covered bit of `out` is rewritten.
pub fn pack_bits(plane: &Array2<f64>, out: &mut [u8]) {
    debug_assert!(out.len() >= packed_len(plane.len()));
    for (i, &value) in plane.iter().enumerate() {
        let mask = 0x80u8 >> (i % 8);
        if value > THRESHOLD {
            out[i / 8] |= mask;
        } else {
            out[i / 8] &= !mask;
        }
    }
}
