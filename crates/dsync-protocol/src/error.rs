//! Protocol error types

use thiserror::Error;

/// Protocol-specific errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Wrong field count for {token}: expected {expected}, got {got}")]
    FieldCount {
        token: String,
        expected: usize,
        got: usize,
    },

    #[error("Frame too large: {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Handshake violation: {0}")]
    Handshake(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] dsync_core::Error),
}

impl ProtocolError {
    /// Whether this error means the frame itself could not be understood
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::ParseError(_)
                | ProtocolError::FieldCount { .. }
                | ProtocolError::MessageTooLarge { .. }
                | ProtocolError::Handshake(_)
                | ProtocolError::Core(dsync_core::Error::InvalidField { .. })
                | ProtocolError::Core(dsync_core::Error::InvalidGpioCode(_))
        )
    }
}

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
