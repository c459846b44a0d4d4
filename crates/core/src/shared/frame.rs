/// A decoded video frame reduced to one 16-bit luminance channel,
/// stored row-major at source resolution.
///
/// Pixel format conversion happens in the decoder; the rest of the
/// pipeline only ever sees gray samples in the full `u16` range.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u16>,
    width: u32,
    height: u32,
    pts: i64,
}

impl Frame {
    pub fn new(data: Vec<u16>, width: u32, height: u32, pts: i64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
            pts,
        }
    }

    /// A zero-sized frame used as the reusable decode target.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0, -1)
    }

    /// Resizes the sample buffer for a `width` x `height` picture,
    /// keeping the allocation when the size is unchanged.
    pub fn reshape(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.resize((width as usize) * (height as usize), 0);
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Presentation timestamp in the stream's time base.
    pub fn pts(&self) -> i64 {
        self.pts
    }

    pub fn set_pts(&mut self, pts: i64) {
        self.pts = pts;
    }
}
