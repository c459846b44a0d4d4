use std::path::PathBuf;

use thiserror::Error;

use crate::config::options::Options;
use crate::rendering::dither::packed_len;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("GPIO failure: {0}")]
    Gpio(String),
    #[error("SPI failure on {device}: {source}")]
    Spi {
        device: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    #[error("bitmap holds {actual} bytes, panel expects {expected}")]
    BitmapSize { expected: usize, actual: usize },
    #[error("cannot encode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where finished bitmaps go.
///
/// Bitmaps are packed 1bpp, row-major, MSB first, sized to the whole
/// panel. Panel polarity is the sink's concern.
pub trait DisplaySink: Send {
    /// Brings the output up. Called once before anything else.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Shows `bitmap`, blocking until the output is done with it.
    fn present(&mut self, bitmap: &[u8]) -> Result<(), DisplayError>;

    /// Marks the configured visible region so it can be aligned with the
    /// physical frame.
    fn test_pattern(&mut self, options: &Options) -> Result<(), DisplayError>;
}

/// Panel-polarity buffer with every bit inside the visible region set.
///
/// Fails with [`DisplayError::InvalidRegion`] when the region is empty or
/// does not fit on the panel.
pub fn region_bitmap(
    options: &Options,
    panel_width: u32,
    panel_height: u32,
) -> Result<Vec<u8>, DisplayError> {
    let x_end = u64::from(options.offset_x) + u64::from(options.width);
    if options.width == 0 || x_end > u64::from(panel_width) {
        return Err(DisplayError::InvalidRegion(format!(
            "invalid width: offsetX {} + width {} exceeds {panel_width}",
            options.offset_x, options.width
        )));
    }
    let y_end = u64::from(options.offset_y) + u64::from(options.height);
    if options.height == 0 || y_end > u64::from(panel_height) {
        return Err(DisplayError::InvalidRegion(format!(
            "invalid height: offsetY {} + height {} exceeds {panel_height}",
            options.offset_y, options.height
        )));
    }

    let panel_width = panel_width as usize;
    let mut buffer = vec![0u8; packed_len(panel_width * panel_height as usize)];
    for y in options.offset_y as usize..y_end as usize {
        for x in options.offset_x as usize..x_end as usize {
            let i = y * panel_width + x;
            buffer[i / 8] |= 1 << (7 - i % 8);
        }
    }
    Ok(buffer)
}

/// Checks that `bitmap` covers a `width` x `height` panel exactly.
pub fn check_bitmap_len(bitmap: &[u8], width: u32, height: u32) -> Result<(), DisplayError> {
    let expected = packed_len(width as usize * height as usize);
    if bitmap.len() != expected {
        return Err(DisplayError::BitmapSize {
            expected,
            actual: bitmap.len(),
        });
    }
    Ok(())
}
