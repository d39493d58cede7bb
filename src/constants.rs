pub const DEFAULT_BAUD_RATE: u32 = 115200;
pub const DEFAULT_SERIAL_TIMEOUT_MS: u64 = 1000;

/// Opening the port resets the Arduino; nothing may be sent until it has booted.
pub const SETTLE_DELAY_MS: u64 = 2000;

pub const PROGRAM_SIZE: usize = 32 * 1024;
pub const POST_WRITE_DELAY_MICROS: u64 = 100;
pub const PROGRESS_STEP: usize = 1024;

pub const ERASE_SUCCESS: u8 = 0xFF;

/// Value of unprogrammed EEPROM cells, used to pad HEX images
pub(crate) const ERASED_BYTE: u8 = 0xFF;
