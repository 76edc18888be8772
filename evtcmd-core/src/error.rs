//! Core error types.

use evtcmd_protocol::ProtocolError;
use thiserror::Error;

/// Errors from command registration and listening.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("registry full: cannot register '{command}' (capacity {capacity})")]
    CapacityExceeded { command: String, capacity: usize },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl CoreError {
    /// Returns an error code suitable for logs and replies.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            CoreError::Protocol(e) => e.error_code(),
        }
    }

    /// Returns whether polling can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Protocol(_))
    }
}
