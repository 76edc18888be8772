//! # evtcmd-protocol
//!
//! Frame grammar for evtcmd command listeners.
//!
//! This crate provides:
//! - The `>command:data!` frame grammar and its sentinel bytes
//! - The byte source and pacing abstractions a scanner reads through
//! - An incremental, resumable frame scanner
//! - Protocol error types

pub mod error;
pub mod frame;
pub mod pacing;
pub mod scanner;
pub mod source;

pub use error::{Field, ProtocolError};
pub use frame::{Frame, COMMAND_START, DATA_START, TERMINATOR};
pub use pacing::{NoPacing, Pacer, ThreadPacer};
pub use scanner::{ScanState, Scanner};
pub use source::{BufferSource, ByteSource};

use std::time::Duration;

/// Delay applied before each byte read unless configured otherwise.
pub const DEFAULT_READ_DELAY: Duration = Duration::from_millis(5);

/// Default maximum length of the command or data field (0 = unlimited).
pub const DEFAULT_MAX_FIELD_LEN: usize = 256;
