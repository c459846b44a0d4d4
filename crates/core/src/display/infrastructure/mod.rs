pub mod epaper_display;
#[cfg(all(target_os = "linux", feature = "epaper"))]
pub mod linux_panel_bus;
pub mod png_file_sink;
