pub mod serialport;

use std::time::Duration;

use crate::error::EepromResult;

pub type ComPort = String;
pub type BaudRate = u32;

/// Byte stream to the programmer board
pub trait DeviceInterface {
    /// Send raw bytes to the device
    fn send(&mut self, bytes: &[u8]) -> EepromResult<()>;

    /// Receive a single byte, `None` when the read timed out
    fn receive_byte(&mut self) -> EepromResult<Option<u8>>;

    /// Flush send/receive buffers
    fn flush_buffers(&mut self) -> EepromResult<()>;
}

/// Blocking wait, injected so timing can be observed in tests
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
