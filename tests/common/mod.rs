#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eeprog::error::EepromResult;
use eeprog::interface::{Delay, DeviceInterface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(u8),
    Read(Option<u8>),
    Delay(Duration),
    Flush,
}

#[derive(Default)]
struct BoardState {
    events: Vec<Event>,
    responses: VecDeque<u8>,
    echo_payload: bool,
    corrupt_echo_at: Option<usize>,
    writes: usize,
}

/// Scripted programmer board. Clones share state so a test can keep a handle
/// after boxing one into the code under test.
#[derive(Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
    stop_when_drained: Option<Arc<AtomicBool>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes the board will answer with, in order
    pub fn with_responses(self, bytes: &[u8]) -> Self {
        self.state.lock().unwrap().responses.extend(bytes);
        self
    }

    /// Echo every byte after the command byte, like the firmware's ack mode
    pub fn echoing(self) -> Self {
        self.state.lock().unwrap().echo_payload = true;
        self
    }

    /// Echo a wrong value for the payload byte at `position`
    pub fn corrupting_echo_at(self, position: usize) -> Self {
        self.state.lock().unwrap().corrupt_echo_at = Some(position);
        self
    }

    /// Raise `stop` once every scripted response has been read
    pub fn stopping(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop_when_drained = Some(stop);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Read(_)))
            .count()
    }

    pub fn flushes(&self) -> usize {
        self.events().iter().filter(|e| **e == Event::Flush).count()
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay {
            state: Arc::clone(&self.state),
        }
    }
}

impl DeviceInterface for MockBoard {
    fn send(&mut self, bytes: &[u8]) -> EepromResult<()> {
        let mut state = self.state.lock().unwrap();
        for &byte in bytes {
            state.events.push(Event::Write(byte));

            if state.echo_payload && state.writes > 0 {
                let position = state.writes - 1;
                let echo = if state.corrupt_echo_at == Some(position) {
                    !byte
                } else {
                    byte
                };
                state.responses.push_back(echo);
            }
            state.writes += 1;
        }
        Ok(())
    }

    fn receive_byte(&mut self) -> EepromResult<Option<u8>> {
        let mut state = self.state.lock().unwrap();
        let byte = state.responses.pop_front();
        state.events.push(Event::Read(byte));

        if byte.is_none() {
            if let Some(stop) = &self.stop_when_drained {
                stop.store(true, Ordering::SeqCst);
            }
        }
        Ok(byte)
    }

    fn flush_buffers(&mut self) -> EepromResult<()> {
        self.state.lock().unwrap().events.push(Event::Flush);
        Ok(())
    }
}

/// Records waits in the board's event log instead of sleeping
pub struct MockDelay {
    state: Arc<Mutex<BoardState>>,
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Duration) {
        self.state.lock().unwrap().events.push(Event::Delay(duration));
    }
}
