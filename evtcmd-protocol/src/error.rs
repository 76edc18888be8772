//! Protocol error types.

use std::fmt;
use thiserror::Error;

/// The two text fields of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Command,
    Data,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Command => write!(f, "command"),
            Field::Data => write!(f, "data"),
        }
    }
}

/// Errors that can occur while scanning frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{field} field too long: exceeds {max} bytes")]
    FieldTooLong { field: Field, max: usize },
}

impl ProtocolError {
    /// Returns a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::FieldTooLong { .. } => "FIELD_TOO_LONG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_display() {
        assert_eq!(format!("{}", Field::Command), "command");
        assert_eq!(format!("{}", Field::Data), "data");
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::FieldTooLong {
            field: Field::Data,
            max: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("data"));
        assert!(msg.contains("16"));
        assert_eq!(err.error_code(), "FIELD_TOO_LONG");
    }
}
