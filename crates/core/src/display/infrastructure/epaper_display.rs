use crate::config::options::Options;
use crate::display::domain::display_sink::{
    check_bitmap_len, region_bitmap, DisplayError, DisplaySink,
};
use crate::display::domain::panel_bus::PanelBus;
use crate::rendering::dither::packed_len;
use crate::shared::constants::{PANEL_HEIGHT, PANEL_WIDTH};

const POWER_SETTING: u8 = 0x01;
const POWER_ON: u8 = 0x04;
const PANEL_SETTING: u8 = 0x00;
const RESOLUTION_SETTING: u8 = 0x61;
const DUAL_SPI: u8 = 0x15;
const VCOM_DATA_INTERVAL: u8 = 0x50;
const TCON_SETTING: u8 = 0x60;
const GET_STATUS: u8 = 0x71;
const DISPLAY_REFRESH: u8 = 0x12;
const OLD_DATA: u8 = 0x10;
const NEW_DATA: u8 = 0x13;

/// Driver for the 7.5" 800x480 black/white e-paper panel (V2 controller).
///
/// The panel reads 1 as black, so presented bitmaps are inverted on the
/// way out.
pub struct EPaperDisplay<B: PanelBus> {
    bus: B,
    buffer: Vec<u8>,
}

impl<B: PanelBus> EPaperDisplay<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            buffer: vec![0; packed_len(PANEL_WIDTH as usize * PANEL_HEIGHT as usize)],
        }
    }

    /// Blanks both controller frame buffers and refreshes.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.buffer.fill(0);
        self.send_command(OLD_DATA)?;
        self.send_buffer()?;
        self.send_command(NEW_DATA)?;
        self.send_buffer()?;
        self.turn_on()
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.bus.set_reset(true)?;
        self.bus.delay_ms(200);
        self.bus.set_reset(false)?;
        self.bus.delay_ms(2);
        self.bus.set_reset(true)?;
        self.bus.delay_ms(200);
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.bus.set_data_mode(false)?;
        self.bus.write(&[command])
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.bus.set_data_mode(true)?;
        self.bus.write(data)
    }

    fn send_buffer(&mut self) -> Result<(), DisplayError> {
        self.bus.set_data_mode(true)?;
        self.bus.write(&self.buffer)
    }

    fn wait_until_idle(&mut self) -> Result<(), DisplayError> {
        loop {
            self.send_command(GET_STATUS)?;
            self.bus.delay_ms(1);
            if self.bus.is_idle()? {
                break;
            }
        }
        self.bus.delay_ms(200);
        Ok(())
    }

    fn turn_on(&mut self) -> Result<(), DisplayError> {
        self.send_command(DISPLAY_REFRESH)?;
        // The controller needs at least 200us before BUSY is meaningful.
        self.bus.delay_ms(100);
        self.wait_until_idle()
    }
}

impl<B: PanelBus> DisplaySink for EPaperDisplay<B> {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.reset()?;

        // VGH=20V, VGL=-20V, VDH=15V, VDL=-15V
        self.send_command(POWER_SETTING)?;
        self.send_data(&[0x07, 0x07, 0x3f, 0x3f])?;

        self.send_command(POWER_ON)?;
        self.bus.delay_ms(100);
        self.wait_until_idle()?;

        self.send_command(PANEL_SETTING)?;
        self.send_data(&[0x1f])?;

        // 800 source x 480 gate
        self.send_command(RESOLUTION_SETTING)?;
        self.send_data(&[0x03, 0x20, 0x01, 0xe0])?;

        self.send_command(DUAL_SPI)?;
        self.send_data(&[0x00])?;

        self.send_command(VCOM_DATA_INTERVAL)?;
        self.send_data(&[0x10, 0x07])?;

        self.send_command(TCON_SETTING)?;
        self.send_data(&[0x22])?;

        log::info!("E-paper panel initialized ({PANEL_WIDTH}x{PANEL_HEIGHT})");
        Ok(())
    }

    fn present(&mut self, bitmap: &[u8]) -> Result<(), DisplayError> {
        check_bitmap_len(bitmap, PANEL_WIDTH, PANEL_HEIGHT)?;

        for (out, &bits) in self.buffer.iter_mut().zip(bitmap) {
            *out = !bits;
        }
        self.send_command(NEW_DATA)?;
        self.send_buffer()?;
        self.turn_on()
    }

    fn test_pattern(&mut self, options: &Options) -> Result<(), DisplayError> {
        self.buffer = region_bitmap(options, PANEL_WIDTH, PANEL_HEIGHT)?;
        self.send_command(NEW_DATA)?;
        self.send_buffer()?;
        self.turn_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const PANEL_BYTES: usize = 48_000;

    #[derive(Clone, Debug, PartialEq)]
    enum BusOp {
        Reset(bool),
        DataMode(bool),
        Write(Vec<u8>),
        Delay(u64),
        IdlePoll,
    }

    /// Records every bus call; BUSY stays low for `busy_polls` reads per
    /// wait.
    #[derive(Clone)]
    struct RecordingBus {
        ops: Arc<Mutex<Vec<BusOp>>>,
        busy_polls: u32,
        remaining: u32,
    }

    impl RecordingBus {
        fn new(busy_polls: u32) -> Self {
            Self {
                ops: Arc::new(Mutex::new(Vec::new())),
                busy_polls,
                remaining: busy_polls,
            }
        }

        fn ops(&self) -> Vec<BusOp> {
            self.ops.lock().unwrap().clone()
        }

        fn push(&self, op: BusOp) {
            self.ops.lock().unwrap().push(op);
        }

        /// Commands with the data bytes sent after each.
        fn transactions(&self) -> Vec<(u8, Vec<u8>)> {
            let mut data_mode = false;
            let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
            for op in self.ops() {
                match op {
                    BusOp::DataMode(mode) => data_mode = mode,
                    BusOp::Write(bytes) if data_mode => {
                        out.last_mut().unwrap().1.extend_from_slice(&bytes)
                    }
                    BusOp::Write(bytes) => {
                        assert_eq!(bytes.len(), 1, "commands are single bytes");
                        out.push((bytes[0], Vec::new()));
                    }
                    _ => {}
                }
            }
            out
        }

        fn commands(&self) -> Vec<u8> {
            self.transactions().into_iter().map(|(c, _)| c).collect()
        }
    }

    impl PanelBus for RecordingBus {
        fn set_reset(&mut self, high: bool) -> Result<(), DisplayError> {
            self.push(BusOp::Reset(high));
            Ok(())
        }

        fn set_data_mode(&mut self, data: bool) -> Result<(), DisplayError> {
            self.push(BusOp::DataMode(data));
            Ok(())
        }

        fn is_idle(&mut self) -> Result<bool, DisplayError> {
            self.push(BusOp::IdlePoll);
            if self.remaining > 0 {
                self.remaining -= 1;
                return Ok(false);
            }
            self.remaining = self.busy_polls;
            Ok(true)
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            self.push(BusOp::Write(bytes.to_vec()));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u64) {
            self.push(BusOp::Delay(ms));
        }
    }

    struct BrokenBus;

    impl PanelBus for BrokenBus {
        fn set_reset(&mut self, _high: bool) -> Result<(), DisplayError> {
            Err(DisplayError::Gpio("line 17 unavailable".to_string()))
        }

        fn set_data_mode(&mut self, _data: bool) -> Result<(), DisplayError> {
            Ok(())
        }

        fn is_idle(&mut self) -> Result<bool, DisplayError> {
            Ok(true)
        }

        fn write(&mut self, _bytes: &[u8]) -> Result<(), DisplayError> {
            Ok(())
        }

        fn delay_ms(&mut self, _ms: u64) {}
    }

    fn display(busy_polls: u32) -> (EPaperDisplay<RecordingBus>, RecordingBus) {
        let bus = RecordingBus::new(busy_polls);
        (EPaperDisplay::new(bus.clone()), bus)
    }

    #[test]
    fn test_init_starts_with_reset_pulse() {
        let (mut epd, bus) = display(0);
        epd.init().unwrap();

        assert_eq!(
            bus.ops()[..6],
            [
                BusOp::Reset(true),
                BusOp::Delay(200),
                BusOp::Reset(false),
                BusOp::Delay(2),
                BusOp::Reset(true),
                BusOp::Delay(200),
            ]
        );
    }

    #[test]
    fn test_init_sequence() {
        let (mut epd, bus) = display(0);
        epd.init().unwrap();

        assert_eq!(
            bus.transactions(),
            vec![
                (0x01, vec![0x07, 0x07, 0x3f, 0x3f]),
                (0x04, vec![]),
                (0x71, vec![]),
                (0x00, vec![0x1f]),
                (0x61, vec![0x03, 0x20, 0x01, 0xe0]),
                (0x15, vec![0x00]),
                (0x50, vec![0x10, 0x07]),
                (0x60, vec![0x22]),
            ]
        );
    }

    #[test]
    fn test_wait_polls_status_until_idle() {
        let (mut epd, bus) = display(2);
        epd.init().unwrap();

        let commands = bus.commands();
        assert_eq!(commands.iter().filter(|&&c| c == 0x71).count(), 3);

        // Each poll: status command, 1ms, read. Then 200ms settle.
        let ops = bus.ops();
        let power_on = ops
            .iter()
            .position(|op| *op == BusOp::Write(vec![0x04]))
            .unwrap();
        assert_eq!(ops[power_on + 1], BusOp::Delay(100));
        let polls: Vec<_> = ops[power_on + 2..]
            .iter()
            .take_while(|op| !matches!(op, BusOp::Delay(200)))
            .cloned()
            .collect();
        let poll = [
            BusOp::DataMode(false),
            BusOp::Write(vec![0x71]),
            BusOp::Delay(1),
            BusOp::IdlePoll,
        ];
        let expected: Vec<BusOp> = poll.iter().cloned().cycle().take(12).collect();
        assert_eq!(polls, expected);
    }

    #[test]
    fn test_present_inverts_and_refreshes() {
        let (mut epd, bus) = display(0);
        let mut bitmap = vec![0xFF; PANEL_BYTES];
        bitmap[0] = 0x0F;

        epd.present(&bitmap).unwrap();

        let transactions = bus.transactions();
        assert_eq!(transactions[0].0, 0x13);
        let sent = &transactions[0].1;
        assert_eq!(sent.len(), PANEL_BYTES);
        assert_eq!(sent[0], 0xF0);
        assert!(sent[1..].iter().all(|&b| b == 0x00));
        assert_eq!(bus.commands()[1..], [0x12, 0x71]);
    }

    #[test]
    fn test_present_rejects_wrong_size() {
        let (mut epd, bus) = display(0);
        let result = epd.present(&[0; 100]);

        assert!(matches!(result, Err(DisplayError::BitmapSize { .. })));
        assert!(bus.ops().is_empty());
    }

    #[test]
    fn test_clear_blanks_both_buffers() {
        let (mut epd, bus) = display(0);
        epd.present(&vec![0x00; PANEL_BYTES]).unwrap();
        let before = bus.transactions().len();

        epd.clear().unwrap();

        let transactions = &bus.transactions()[before..];
        assert_eq!(transactions[0].0, 0x10);
        assert_eq!(transactions[0].1, vec![0; PANEL_BYTES]);
        assert_eq!(transactions[1].0, 0x13);
        assert_eq!(transactions[1].1, vec![0; PANEL_BYTES]);
        assert_eq!(transactions[2].0, 0x12);
    }

    #[test]
    fn test_pattern_sends_region_bits_uninverted() {
        let (mut epd, bus) = display(0);
        let options = Options {
            offset_x: 8,
            offset_y: 0,
            width: 8,
            height: 1,
            ..Options::default()
        };

        epd.test_pattern(&options).unwrap();

        let transactions = bus.transactions();
        assert_eq!(transactions[0].0, 0x13);
        let sent = &transactions[0].1;
        assert_eq!(sent.len(), PANEL_BYTES);
        assert_eq!(sent[1], 0xFF);
        assert_eq!(sent.iter().map(|b| b.count_ones()).sum::<u32>(), 8);
        assert_eq!(transactions[1].0, 0x12);
    }

    #[test]
    fn test_pattern_rejects_region_outside_panel() {
        let (mut epd, bus) = display(0);
        let options = Options {
            offset_x: 10,
            width: 800,
            ..Options::default()
        };

        assert!(matches!(
            epd.test_pattern(&options),
            Err(DisplayError::InvalidRegion(_))
        ));
        assert!(bus.ops().is_empty());
    }

    #[test]
    fn test_bus_failure_propagates() {
        let mut epd = EPaperDisplay::new(BrokenBus);
        assert!(matches!(epd.init(), Err(DisplayError::Gpio(_))));
    }
}
