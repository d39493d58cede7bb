use std::{fs::File, io::BufWriter, path::Path, time::Duration};

use constants::{
    DEFAULT_BAUD_RATE, DEFAULT_SERIAL_TIMEOUT_MS, POST_WRITE_DELAY_MICROS, SETTLE_DELAY_MS,
};
use error::{EepromError, EepromResult};
use image::Image;
use interface::{BaudRate, Delay, DeviceInterface, ThreadDelay, serialport::SerialPortDevice};
use protocols::eeprom::{Eeprom, EepromParams};
use session::Session;

pub use protocols::eeprom::ProgramReport;
pub use protocols::{Command, ProgramMode};

pub mod constants;
pub mod error;
pub mod image;
pub mod interface;
pub mod monitor;
pub mod ports;
pub mod protocols;
pub mod session;
pub mod util;

/// Knobs for talking to the programmer board
#[derive(Debug, Clone, Copy)]
pub struct ProgrammerOptions {
    pub baud: BaudRate,
    pub timeout: Duration,
    pub settle: Duration,
    pub mode: ProgramMode,
    pub write_delay: Duration,
}

impl Default for ProgrammerOptions {
    fn default() -> Self {
        ProgrammerOptions {
            baud: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(DEFAULT_SERIAL_TIMEOUT_MS),
            settle: Duration::from_millis(SETTLE_DELAY_MS),
            mode: ProgramMode::Delay,
            write_delay: Duration::from_micros(POST_WRITE_DELAY_MICROS),
        }
    }
}

/// Connection to the programmer good for a single operation
pub struct Programmer {
    eeprom: Eeprom,
}

impl Programmer {
    /// Open `port`, wait for the board to reset and get ready for one command
    pub fn connect(port: &str, options: ProgrammerOptions) -> EepromResult<Self> {
        let device = SerialPortDevice::open(port, options.baud, options.timeout)?;
        Ok(Self::with_interface(
            Box::new(device),
            Box::new(ThreadDelay),
            options,
        ))
    }

    /// Drive an already opened byte stream
    pub fn with_interface(
        interface: Box<dyn DeviceInterface>,
        delay: Box<dyn Delay>,
        options: ProgrammerOptions,
    ) -> Self {
        let session = Session::open(interface, delay, options.settle);
        let params = EepromParams {
            mode: options.mode,
            write_delay: options.write_delay,
        };

        Programmer {
            eeprom: Eeprom::new(session, params),
        }
    }

    pub fn progress_bar(&mut self, enable: bool) {
        self.eeprom.progress_bar(enable);
    }

    /// Program the memory with a raw binary or Intel HEX file
    pub fn program_file(self, file_path: &Path) -> EepromResult<ProgramReport> {
        let image = Image::from_file(file_path)?;
        self.program_image(&image)
    }

    pub fn program_image(self, image: &Image) -> EepromResult<ProgramReport> {
        self.eeprom.program(image)
    }

    /// Dump `byte_count` bytes from `start` into a newly created file
    pub fn dump_to_file(
        self,
        file_path: &Path,
        start: u16,
        byte_count: u16,
    ) -> EepromResult<Vec<u8>> {
        let file = File::create(file_path).map_err(|e| {
            EepromError::File(format!("Failed to create {}: {}", file_path.display(), e))
        })?;
        let mut sink = BufWriter::new(file);

        self.eeprom.dump(start, byte_count, &mut sink)
    }

    pub fn dump<W: std::io::Write>(
        self,
        start: u16,
        byte_count: u16,
        sink: &mut W,
    ) -> EepromResult<Vec<u8>> {
        self.eeprom.dump(start, byte_count, sink)
    }

    pub fn erase(self) -> EepromResult<()> {
        self.eeprom.erase()
    }
}
