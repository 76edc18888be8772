//! Incremental frame scanner.
//!
//! The scanner pulls bytes from a [`ByteSource`] one at a time and drives a
//! three-state machine over the sentinel bytes. A scan that runs out of input
//! keeps everything it has seen, so the next call picks up mid-frame.

use crate::error::{Field, ProtocolError};
use crate::frame::{Frame, COMMAND_START, DATA_START, TERMINATOR};
use crate::pacing::{Pacer, ThreadPacer};
use crate::source::ByteSource;
use crate::{DEFAULT_MAX_FIELD_LEN, DEFAULT_READ_DELAY};
use std::time::Duration;

/// Scanner position within the frame grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Outside a frame, discarding noise until `'>'`.
    Idle,
    /// Appending to the command field.
    ReadingCommand,
    /// Appending to the data field.
    ReadingData,
}

/// Turns a byte stream into complete frames.
pub struct Scanner<S, P = ThreadPacer> {
    source: S,
    pacer: P,
    frame: Frame,
    state: ScanState,
    read_delay: Duration,
    /// Maximum bytes per field (0 = unlimited).
    max_field_len: usize,
}

impl<S: ByteSource> Scanner<S> {
    /// Creates a scanner that sleeps the calling thread between reads.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pacer: ThreadPacer,
            frame: Frame::new(),
            state: ScanState::Idle,
            read_delay: DEFAULT_READ_DELAY,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

impl<S: ByteSource, P: Pacer> Scanner<S, P> {
    /// Replaces the pacer.
    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> Scanner<S, Q> {
        Scanner {
            source: self.source,
            pacer,
            frame: self.frame,
            state: self.state,
            read_delay: self.read_delay,
            max_field_len: self.max_field_len,
        }
    }

    /// Sets the pause before each byte read. Zero disables pacing.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Sets the per-field byte limit. Zero means unlimited.
    pub fn with_max_field_len(mut self, max: usize) -> Self {
        self.max_field_len = max;
        self
    }

    /// Consumes available bytes until a frame completes.
    ///
    /// Returns `Ok(true)` as soon as a terminator is processed; bytes after
    /// it stay in the source. Returns `Ok(false)` once the source has nothing
    /// more to give, keeping partial state for the next call.
    ///
    /// A field growing past the configured limit drops the partial frame and
    /// returns [`ProtocolError::FieldTooLong`].
    pub fn scan(&mut self) -> Result<bool, ProtocolError> {
        while self.source.available() > 0 {
            if !self.read_delay.is_zero() {
                self.pacer.pause(self.read_delay);
            }
            let Some(byte) = self.source.read() else {
                break;
            };
            if self.accept(byte)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn accept(&mut self, byte: u8) -> Result<bool, ProtocolError> {
        match (self.state, byte) {
            (_, COMMAND_START) => {
                self.frame.clear();
                self.state = ScanState::ReadingCommand;
            }
            // Noise before a frame, including stray ':' and '!'
            (ScanState::Idle, _) => {}
            (_, DATA_START) => {
                self.frame.clear_data();
                self.state = ScanState::ReadingData;
            }
            (_, TERMINATOR) => {
                self.state = ScanState::Idle;
                self.frame.mark_complete();
                tracing::trace!(
                    command = %self.frame.command_str(),
                    data = %self.frame.data_str(),
                    "frame complete"
                );
                return Ok(true);
            }
            (ScanState::ReadingCommand, _) => self.append(Field::Command, byte)?,
            (ScanState::ReadingData, _) => self.append(Field::Data, byte)?,
        }
        Ok(false)
    }

    fn append(&mut self, field: Field, byte: u8) -> Result<(), ProtocolError> {
        let len = match field {
            Field::Command => self.frame.command().len(),
            Field::Data => self.frame.data().len(),
        };
        if self.max_field_len != 0 && len >= self.max_field_len {
            tracing::warn!(%field, max = self.max_field_len, "field overflow, dropping frame");
            self.reset();
            return Err(ProtocolError::FieldTooLong {
                field,
                max: self.max_field_len,
            });
        }
        match field {
            Field::Command => self.frame.command_buf().extend_from_slice(&[byte]),
            Field::Data => self.frame.data_buf().extend_from_slice(&[byte]),
        }
        Ok(())
    }

    /// Abandons any partial frame and returns to [`ScanState::Idle`].
    pub fn reset(&mut self) {
        self.frame.clear();
        self.state = ScanState::Idle;
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The frame most recently completed or being assembled.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, e.g. to push newly received bytes.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn read_delay(&self) -> Duration {
        self.read_delay
    }

    pub fn max_field_len(&self) -> usize {
        self.max_field_len
    }
}
