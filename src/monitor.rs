use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::error::{EepromError, EepromResult};
use crate::interface::DeviceInterface;

/// What one incoming byte produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A complete character
    Char(char),

    /// Part of a multi-byte sequence, more bytes needed
    Pending,

    /// Bytes that cannot start or continue a UTF-8 sequence
    Invalid(Vec<u8>),
}

/// Incremental UTF-8 decoder fed one byte at a time
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    expected: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn sequence_length(lead: u8) -> Option<usize> {
        match lead {
            0x00..=0x7F => Some(1),
            0xC2..=0xDF => Some(2),
            0xE0..=0xEF => Some(3),
            0xF0..=0xF4 => Some(4),
            _ => None,
        }
    }

    pub fn push(&mut self, byte: u8) -> Vec<DecodeEvent> {
        if self.pending.is_empty() {
            return vec![self.start(byte)];
        }

        if byte & 0xC0 != 0x80 {
            // Sequence cut short; report it and let the byte start afresh
            let broken = std::mem::take(&mut self.pending);
            return vec![DecodeEvent::Invalid(broken), self.start(byte)];
        }

        self.pending.push(byte);
        if self.pending.len() < self.expected {
            return vec![DecodeEvent::Pending];
        }

        let sequence = std::mem::take(&mut self.pending);
        match std::str::from_utf8(&sequence).ok().and_then(|s| s.chars().next()) {
            Some(c) => vec![DecodeEvent::Char(c)],
            None => vec![DecodeEvent::Invalid(sequence)],
        }
    }

    fn start(&mut self, byte: u8) -> DecodeEvent {
        match Self::sequence_length(byte) {
            Some(1) => DecodeEvent::Char(byte as char),
            Some(len) => {
                self.pending.push(byte);
                self.expected = len;
                DecodeEvent::Pending
            }
            None => DecodeEvent::Invalid(vec![byte]),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    pub bytes_read: usize,
    pub chars_written: usize,
    pub decode_errors: usize,
}

/// Read-only tap on the programmer's serial output
pub struct Monitor {
    interface: Box<dyn DeviceInterface>,
    stop: Arc<AtomicBool>,
    decoder: Utf8Decoder,
}

impl Monitor {
    pub fn new(interface: Box<dyn DeviceInterface>, stop: Arc<AtomicBool>) -> Self {
        Monitor {
            interface,
            stop,
            decoder: Utf8Decoder::new(),
        }
    }

    /// Echo decoded text to `output` until the stop flag is raised
    pub fn run<W: Write>(&mut self, output: &mut W) -> EepromResult<MonitorStats> {
        info!("Listening, press Ctrl-C to stop");
        let mut stats = MonitorStats::default();

        while !self.stop.load(Ordering::SeqCst) {
            let Some(byte) = self.interface.receive_byte()? else {
                continue;
            };
            stats.bytes_read += 1;

            for event in self.decoder.push(byte) {
                match event {
                    DecodeEvent::Char(c) => {
                        write!(output, "{}", c).map_err(output_error)?;
                        stats.chars_written += 1;
                    }
                    DecodeEvent::Invalid(bytes) => {
                        warn!("Received bytes that are not valid UTF-8: {:02x?}", bytes);
                        write!(output, "{}", char::REPLACEMENT_CHARACTER)
                            .map_err(output_error)?;
                        stats.decode_errors += 1;
                    }
                    DecodeEvent::Pending => {}
                }
            }
            output.flush().map_err(output_error)?;
        }

        info!("Monitor stopped after {} bytes", stats.bytes_read);
        Ok(stats)
    }
}

fn output_error(e: std::io::Error) -> EepromError {
    EepromError::File(format!("Failed to write monitor output: {}", e))
}
