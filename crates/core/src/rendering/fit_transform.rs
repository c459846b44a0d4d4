use crate::config::options::Options;
use crate::shared::video_format::VideoFormat;

/// Where and how large a source picture lands on the panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub ratio: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Top-left of the scaled picture in panel coordinates. Negative
    /// when the picture overflows the panel's left or top edge.
    pub offset_x: i64,
    pub offset_y: i64,
}

impl FitTransform {
    /// Chooses between filling the visible region (cropping the excess)
    /// and letterboxing inside it.
    ///
    /// Fill is only used when its ratio lies strictly between the
    /// letterbox ratio and the largest ratio that still fits the panel;
    /// ties resolve to letterbox.
    pub fn compute(
        format: &VideoFormat,
        options: &Options,
        panel_width: u32,
        panel_height: u32,
    ) -> Self {
        let src_w = f64::from(format.width);
        let src_h = f64::from(format.height);
        let vis_w = f64::from(options.width);
        let vis_h = f64::from(options.height);

        let max_ratio = (f64::from(panel_width) / src_w).min(f64::from(panel_height) / src_h);
        let overflow_ratio = (vis_w / src_w).max(vis_h / src_h);
        let min_ratio = (vis_w / src_w).min(vis_h / src_h);

        let ratio = if overflow_ratio < max_ratio && overflow_ratio > min_ratio {
            overflow_ratio
        } else {
            min_ratio
        };

        let scaled_width = ((src_w * ratio) as u32).max(1);
        let scaled_height = ((src_h * ratio) as u32).max(1);

        let offset_x =
            i64::from(options.offset_x) + (i64::from(options.width) - i64::from(scaled_width)) / 2;
        let offset_y = i64::from(options.offset_y)
            + (i64::from(options.height) - i64::from(scaled_height)) / 2;

        Self {
            ratio,
            scaled_width,
            scaled_height,
            offset_x,
            offset_y,
        }
    }
}
