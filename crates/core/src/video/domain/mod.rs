pub mod frame_decoder;
pub mod frame_source;
