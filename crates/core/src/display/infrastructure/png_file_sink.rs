use std::fs;
use std::path::PathBuf;

use image::{GrayImage, ImageFormat, Luma};

use crate::config::options::Options;
use crate::display::domain::display_sink::{
    check_bitmap_len, region_bitmap, DisplayError, DisplaySink,
};

/// Writes what the panel would show to a PNG file, replacing it on every
/// frame. Used when no panel is attached.
pub struct PngFileSink {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl PngFileSink {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Saves panel-polarity bits (1 = black).
    fn write_panel_bits(&self, bits: impl Fn(usize) -> bool) -> Result<(), DisplayError> {
        let width = self.width as usize;
        let img = GrayImage::from_fn(self.width, self.height, |x, y| {
            let black = bits(y as usize * width + x as usize);
            Luma([if black { 0 } else { 255 }])
        });

        // Write to a temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("part");
        img.save_with_format(&temp_path, ImageFormat::Png)
            .map_err(|e| DisplayError::Image {
                path: temp_path.clone(),
                source: e,
            })?;
        fs::rename(&temp_path, &self.path).map_err(|e| DisplayError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

fn bit_at(bytes: &[u8], i: usize) -> bool {
    bytes[i / 8] & (1 << (7 - i % 8)) != 0
}

impl DisplaySink for PngFileSink {
    fn init(&mut self) -> Result<(), DisplayError> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DisplayError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        log::info!("Writing frames to {}", self.path.display());
        Ok(())
    }

    fn present(&mut self, bitmap: &[u8]) -> Result<(), DisplayError> {
        check_bitmap_len(bitmap, self.width, self.height)?;
        self.write_panel_bits(|i| !bit_at(bitmap, i))
    }

    fn test_pattern(&mut self, options: &Options) -> Result<(), DisplayError> {
        let region = region_bitmap(options, self.width, self.height)?;
        self.write_panel_bits(|i| bit_at(&region, i))
    }
}
