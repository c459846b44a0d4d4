pub mod dither;
pub mod fit_transform;
pub mod image_renderer;
pub mod lanczos;
