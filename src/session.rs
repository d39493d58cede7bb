use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{EepromError, EepromResult};
use crate::interface::{Delay, DeviceInterface};
use crate::protocols::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Settling,
    Ready,
    InUse,
}

/// One half-duplex exchange with the programmer.
///
/// A session owns the byte stream for the duration of a single operation.
/// It waits out the board reset before anything is sent, allows exactly one
/// command byte, and flushes the stream when it is closed or dropped.
pub struct Session {
    interface: Box<dyn DeviceInterface>,
    delay: Box<dyn Delay>,
    state: SessionState,
    command: Option<Command>,
}

impl Session {
    /// Take over a freshly opened stream and wait `settle` for the board to boot
    pub fn open(
        interface: Box<dyn DeviceInterface>,
        delay: Box<dyn Delay>,
        settle: Duration,
    ) -> Self {
        let mut session = Session {
            interface,
            delay,
            state: SessionState::Opening,
            command: None,
        };

        session.transition(SessionState::Settling);
        debug!("Waiting {:?} for the board to reset", settle);
        session.delay.delay(settle);
        session.transition(SessionState::Ready);

        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn command(&self) -> Option<Command> {
        self.command
    }

    fn transition(&mut self, next: SessionState) {
        trace!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Send the command byte that opens the exchange
    pub fn begin(&mut self, command: Command) -> EepromResult<()> {
        if self.state != SessionState::Ready {
            return Err(EepromError::Session(format!(
                "Cannot send {:?} while session is {:?}",
                command, self.state
            )));
        }

        debug!("Sending command {:?}", command);
        self.interface.send(&[command as u8])?;
        self.command = Some(command);
        self.transition(SessionState::InUse);
        Ok(())
    }

    fn ensure_in_use(&self) -> EepromResult<()> {
        if self.state == SessionState::InUse {
            Ok(())
        } else {
            Err(EepromError::Session(format!(
                "No command in progress, session is {:?}",
                self.state
            )))
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> EepromResult<()> {
        self.ensure_in_use()?;
        self.interface.send(bytes)
    }

    pub fn read_byte(&mut self) -> EepromResult<Option<u8>> {
        self.ensure_in_use()?;
        self.interface.receive_byte()
    }

    pub fn pause(&mut self, duration: Duration) {
        self.delay.delay(duration);
    }

    /// Flush and release the stream
    pub fn close(mut self) -> EepromResult<()> {
        self.release()
    }

    fn release(&mut self) -> EepromResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.transition(SessionState::Closed);
        self.interface.flush_buffers()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release session: {}", e);
        }
    }
}
