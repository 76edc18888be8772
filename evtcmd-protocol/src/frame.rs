//! Command frame format.
//!
//! A frame is delimited by three sentinel bytes:
//!
//! ```text
//! +-----+-----------+-----+-----------+-----+
//! | '>' |  command  | ':' |   data    | '!' |
//! +-----+-----------+-----+-----------+-----+
//!                   |<-- optional --->|
//! ```
//!
//! Bytes before the opening `'>'` are noise and never reach the frame.

use bytes::BytesMut;
use std::borrow::Cow;

/// Starts a frame and the command field.
pub const COMMAND_START: u8 = b'>';

/// Starts the data field.
pub const DATA_START: u8 = b':';

/// Completes a frame.
pub const TERMINATOR: u8 = b'!';

/// A command frame being assembled or ready for dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    command: BytesMut,
    data: BytesMut,
    complete: bool,
}

impl Frame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw command bytes.
    pub fn command(&self) -> &[u8] {
        &self.command
    }

    /// Raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Command as text. Invalid UTF-8 is replaced.
    pub fn command_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.command)
    }

    /// Data as text. Invalid UTF-8 is replaced.
    pub fn data_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Returns true if both fields are empty.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty() && self.data.is_empty()
    }

    /// Returns true once the terminator has been seen. A frame that is not
    /// complete is still being written by its scanner.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Clears both fields and the completion mark.
    pub fn clear(&mut self) {
        self.command.clear();
        self.data.clear();
        self.complete = false;
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn clear_data(&mut self) {
        self.data.clear();
    }

    pub(crate) fn command_buf(&mut self) -> &mut BytesMut {
        &mut self.command
    }

    pub(crate) fn data_buf(&mut self) -> &mut BytesMut {
        &mut self.data
    }
}
