pub mod display_sink;
pub mod panel_bus;
