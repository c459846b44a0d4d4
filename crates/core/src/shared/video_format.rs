/// Geometry and source pixel format of an opened video stream.
///
/// Supplied by the decoder when a file is opened and stable for the
/// lifetime of that file's frame source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
}

impl VideoFormat {
    pub fn new(width: u32, height: u32, pixel_format: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixel_format: pixel_format.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let format = VideoFormat::new(1920, 1080, "yuv420p");
        assert_eq!(format.width, 1920);
        assert_eq!(format.height, 1080);
        assert_eq!(format.pixel_format, "yuv420p");
    }

    #[test]
    fn test_clone_is_equal() {
        let format = VideoFormat::new(640, 480, "gray16le");
        assert_eq!(format.clone(), format);
    }
}
