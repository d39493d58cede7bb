use std::io::Write;
use std::time::Duration;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use super::{Command, ProgramMode, encode_u16};
use crate::constants::{ERASE_SUCCESS, POST_WRITE_DELAY_MICROS, PROGRAM_SIZE, PROGRESS_STEP};
use crate::error::{EepromError, EepromResult};
use crate::image::Image;
use crate::session::Session;
use crate::util::create_progress_bar;

#[derive(Debug, Clone, Copy)]
pub struct EepromParams {
    pub mode: ProgramMode,
    pub write_delay: Duration,
}

impl Default for EepromParams {
    fn default() -> Self {
        EepromParams {
            mode: ProgramMode::Delay,
            write_delay: Duration::from_micros(POST_WRITE_DELAY_MICROS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramReport {
    pub bytes_sent: usize,
}

/// Runs one operation of the programmer protocol over a settled session.
/// Every operation consumes the engine so a session carries a single command.
pub struct Eeprom {
    session: Session,
    params: EepromParams,
    progress_bar_enable: bool,
}

impl Eeprom {
    pub fn new(session: Session, params: EepromParams) -> Self {
        Eeprom {
            session,
            params,
            progress_bar_enable: false,
        }
    }

    pub fn progress_bar(&mut self, enable: bool) {
        self.progress_bar_enable = enable;
    }

    fn progress(&self, total: usize, msg: &str) -> ProgressBar {
        if self.progress_bar_enable {
            create_progress_bar(total as u64, msg)
        } else {
            ProgressBar::hidden()
        }
    }

    /// Write the full 32 KiB image, one byte per step
    pub fn program(mut self, image: &Image) -> EepromResult<ProgramReport> {
        info!("Programming {} bytes ({:?} mode)", PROGRAM_SIZE, self.params.mode);
        let pb = self.progress(PROGRAM_SIZE, "Programming");

        self.session.begin(Command::Program)?;

        for (position, &byte) in image.as_bytes().iter().enumerate() {
            if position % PROGRESS_STEP == 0 {
                pb.set_position(position as u64);
            }

            self.session.write(&[byte])?;

            match self.params.mode {
                ProgramMode::Delay => self.session.pause(self.params.write_delay),
                ProgramMode::Ack => {
                    if let Err(e) = self.await_echo(position, byte) {
                        pb.abandon_with_message("Aborted");
                        warn!("Programming aborted after {} bytes", position + 1);
                        return Err(e);
                    }
                }
            }
        }

        pb.finish_with_message("Done");
        self.session.close()?;

        info!("Done programming!");
        Ok(ProgramReport {
            bytes_sent: PROGRAM_SIZE,
        })
    }

    fn await_echo(&mut self, position: usize, sent: u8) -> EepromResult<()> {
        match self.session.read_byte()? {
            Some(received) if received == sent => Ok(()),
            Some(received) => Err(EepromError::AckMismatch {
                position,
                sent,
                received,
            }),
            None => Err(EepromError::NoResponse(format!(
                "no echo for byte {}",
                position
            ))),
        }
    }

    /// Stream `byte_count` bytes starting at `start` into `sink`.
    ///
    /// Each byte is written to the sink as soon as it arrives, so on a short
    /// read the sink holds everything the device sent before going quiet.
    /// The collected bytes are returned as well for display.
    pub fn dump<W: Write>(
        mut self,
        start: u16,
        byte_count: u16,
        sink: &mut W,
    ) -> EepromResult<Vec<u8>> {
        info!("Dumping {} bytes from {:#06x}", byte_count, start);
        let expected = byte_count as usize;
        let pb = self.progress(expected, "Dumping");

        self.session.begin(Command::Dump)?;
        self.session.write(&encode_u16(start))?;
        self.session.write(&encode_u16(byte_count))?;
        debug!("Sent dump request");

        let mut collected = Vec::with_capacity(expected);
        while collected.len() < expected {
            let byte = match self.session.read_byte()? {
                Some(byte) => byte,
                None => {
                    pb.abandon_with_message("Timed out");
                    return Err(EepromError::ShortRead {
                        received: collected.len(),
                        expected,
                    });
                }
            };

            sink.write_all(&[byte])
                .map_err(|e| EepromError::File(format!("Failed to write dump: {}", e)))?;
            collected.push(byte);

            if collected.len() % PROGRESS_STEP == 0 {
                pb.set_position(collected.len() as u64);
            }
        }

        sink.flush()
            .map_err(|e| EepromError::File(format!("Failed to flush dump: {}", e)))?;
        pb.finish_with_message("Done");
        self.session.close()?;

        info!("Done dumping!");
        Ok(collected)
    }

    /// Erase the whole memory; the board answers a single status byte
    pub fn erase(mut self) -> EepromResult<()> {
        info!("Erasing");
        self.session.begin(Command::Erase)?;

        let response = self.session.read_byte()?;
        self.session.close()?;

        match response {
            Some(ERASE_SUCCESS) => {
                info!("Done erasing!");
                Ok(())
            }
            Some(other) => Err(EepromError::EraseRejected(other)),
            None => Err(EepromError::NoResponse(
                "no status byte after erase".to_string(),
            )),
        }
    }
}
