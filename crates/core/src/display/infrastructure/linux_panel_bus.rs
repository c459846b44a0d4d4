use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use spidev::{SpiModeFlags, Spidev, SpidevOptions};

use crate::display::domain::display_sink::DisplayError;
use crate::display::domain::panel_bus::PanelBus;

const GPIO_CHIP: &str = "/dev/gpiochip0";
const SPI_DEVICE: &str = "/dev/spidev0.0";

const RST_PIN: u32 = 17;
const DC_PIN: u32 = 25;
const BUSY_PIN: u32 = 24;

const SPI_SPEED_HZ: u32 = 10_000_000;
/// spidev rejects transfers larger than its buffer (4096 bytes by default).
const SPI_CHUNK: usize = 4096;

const CONSUMER: &str = "vsmp";

/// Panel wiring of the Waveshare HAT on a Raspberry Pi: GPIO character
/// device for the control lines, spidev for data.
pub struct LinuxPanelBus {
    rst: LineHandle,
    dc: LineHandle,
    busy: LineHandle,
    spi: Spidev,
}

impl LinuxPanelBus {
    pub fn open() -> Result<Self, DisplayError> {
        let mut chip = Chip::new(GPIO_CHIP)
            .map_err(|e| DisplayError::Gpio(format!("cannot open {GPIO_CHIP}: {e}")))?;

        let rst = request_line(&mut chip, RST_PIN, LineRequestFlags::OUTPUT, 1)?;
        let dc = request_line(&mut chip, DC_PIN, LineRequestFlags::OUTPUT, 0)?;
        let busy = request_line(&mut chip, BUSY_PIN, LineRequestFlags::INPUT, 0)?;

        let spi_error = |e| DisplayError::Spi {
            device: PathBuf::from(SPI_DEVICE),
            source: e,
        };
        let mut spi = Spidev::open(SPI_DEVICE).map_err(spi_error)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_SPEED_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(spi_error)?;

        log::debug!(
            "Panel bus on {GPIO_CHIP} (RST {RST_PIN}, DC {DC_PIN}, BUSY {BUSY_PIN}) and {SPI_DEVICE}"
        );
        Ok(Self { rst, dc, busy, spi })
    }
}

fn request_line(
    chip: &mut Chip,
    pin: u32,
    flags: LineRequestFlags,
    default: u8,
) -> Result<LineHandle, DisplayError> {
    chip.get_line(pin)
        .and_then(|line| line.request(flags, default, CONSUMER))
        .map_err(|e| DisplayError::Gpio(format!("cannot request line {pin}: {e}")))
}

fn set_line(handle: &LineHandle, high: bool) -> Result<(), DisplayError> {
    handle.set_value(u8::from(high)).map_err(|e| {
        DisplayError::Gpio(format!("cannot drive line {}: {e}", handle.line().offset()))
    })
}

impl PanelBus for LinuxPanelBus {
    fn set_reset(&mut self, high: bool) -> Result<(), DisplayError> {
        set_line(&self.rst, high)
    }

    fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError> {
        set_line(&self.dc, data)
    }

    fn is_idle(&mut self) -> Result<bool, DisplayError> {
        self.busy
            .get_value()
            .map(|value| value != 0)
            .map_err(|e| DisplayError::Gpio(format!("cannot read line {BUSY_PIN}: {e}")))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        for chunk in bytes.chunks(SPI_CHUNK) {
            self.spi.write_all(chunk).map_err(|e| DisplayError::Spi {
                device: PathBuf::from(SPI_DEVICE),
                source: e,
            })?;
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}
