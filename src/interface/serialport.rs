use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use tracing::{debug, trace};

use super::{BaudRate, DeviceInterface};
use crate::error::{EepromError, EepromResult};

/// Serial port device_interface layer
pub struct SerialPortDevice {
    serial_port: Box<dyn serialport::SerialPort>,
}

impl SerialPortDevice {
    /// Opening the port toggles DTR, which resets the board
    pub fn open(port: &str, baud: BaudRate, timeout: Duration) -> EepromResult<SerialPortDevice> {
        let serial_port = serialport::new(port, baud)
            .timeout(timeout)
            .open()
            .map_err(|e| {
                EepromError::Communication(format!(
                    "Failed to open {} at {} baud: {}",
                    port, baud, e
                ))
            })?;

        debug!("Opened {} at {} baud", port, baud);
        Ok(SerialPortDevice { serial_port })
    }
}

/// Read one byte; a timeout or a signal cutting the wait short means "nothing yet"
pub(crate) fn read_single_byte<R: Read + ?Sized>(reader: &mut R) -> EepromResult<Option<u8>> {
    let mut buffer = [0u8; 1];

    let size = reader
        .read(&mut buffer)
        .or_else(|e| match e.kind() {
            ErrorKind::TimedOut | ErrorKind::Interrupted => Ok(0),
            _ => Err(e),
        })
        .map_err(|e| EepromError::Communication(format!("{:?}", e)))?;

    if size == 0 {
        return Ok(None);
    }

    trace!("Received byte {:#04x}", buffer[0]);
    Ok(Some(buffer[0]))
}

impl DeviceInterface for SerialPortDevice {
    fn send(&mut self, bytes: &[u8]) -> EepromResult<()> {
        self.serial_port
            .write_all(bytes)
            .map_err(|e| EepromError::Communication(format!("{:?}", e)))?;
        trace!("Sent bytes {:02x?}", bytes);
        Ok(())
    }

    fn receive_byte(&mut self) -> EepromResult<Option<u8>> {
        read_single_byte(&mut self.serial_port)
    }

    fn flush_buffers(&mut self) -> EepromResult<()> {
        self.serial_port.flush().map_err(|e| {
            EepromError::Communication(format!("Failed to flush send/receive buffers, {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Monitor;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fails every read with `kind`, raising `stop` first like a Ctrl-C handler would
    struct FailingReader {
        kind: ErrorKind,
        stop: Option<Arc<AtomicBool>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if let Some(stop) = &self.stop {
                stop.store(true, Ordering::SeqCst);
            }
            Err(io::Error::new(self.kind, "read failed"))
        }
    }

    struct ReaderDevice<R: Read>(R);

    impl<R: Read> DeviceInterface for ReaderDevice<R> {
        fn send(&mut self, _bytes: &[u8]) -> EepromResult<()> {
            Ok(())
        }

        fn receive_byte(&mut self) -> EepromResult<Option<u8>> {
            read_single_byte(&mut self.0)
        }

        fn flush_buffers(&mut self) -> EepromResult<()> {
            Ok(())
        }
    }

    fn failing(kind: ErrorKind) -> FailingReader {
        FailingReader { kind, stop: None }
    }

    #[test]
    fn data_is_returned() {
        let mut reader: &[u8] = &[0x41, 0x42];
        assert_eq!(read_single_byte(&mut reader).unwrap(), Some(0x41));
        assert_eq!(read_single_byte(&mut reader).unwrap(), Some(0x42));
        assert_eq!(read_single_byte(&mut reader).unwrap(), None);
    }

    #[test]
    fn timeout_and_interrupt_mean_no_byte_yet() {
        assert_eq!(
            read_single_byte(&mut failing(ErrorKind::TimedOut)).unwrap(),
            None
        );
        assert_eq!(
            read_single_byte(&mut failing(ErrorKind::Interrupted)).unwrap(),
            None
        );
    }

    #[test]
    fn other_read_errors_are_communication_errors() {
        assert!(matches!(
            read_single_byte(&mut failing(ErrorKind::BrokenPipe)),
            Err(EepromError::Communication(_))
        ));
    }

    #[test]
    fn monitor_stops_cleanly_when_a_signal_interrupts_the_read() {
        let stop = Arc::new(AtomicBool::new(false));
        let device = ReaderDevice(FailingReader {
            kind: ErrorKind::Interrupted,
            stop: Some(Arc::clone(&stop)),
        });

        let mut output = Vec::new();
        let stats = Monitor::new(Box::new(device), stop)
            .run(&mut output)
            .unwrap();

        assert_eq!(stats.bytes_read, 0);
        assert!(output.is_empty());
    }
}
