use super::display_sink::DisplayError;

/// Wire-level access to an SPI e-paper panel: reset and data/command
/// lines, the busy line, and the serial bus.
pub trait PanelBus: Send {
    /// Drives the reset line (`true` = high).
    fn set_reset(&mut self, high: bool) -> Result<(), DisplayError>;

    /// Drives the data/command line: `true` for data bytes, `false` for
    /// commands.
    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError>;

    /// Reads the busy line; the panel is idle when it reads high.
    fn is_idle(&mut self) -> Result<bool, DisplayError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    fn delay_ms(&mut self, ms: u64);
}
