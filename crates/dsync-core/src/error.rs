//! Error types for dsync core

use crate::resource::ResourceKind;
use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{kind} not found: {key}")]
    KeyNotFound { kind: ResourceKind, key: String },

    #[error("Invalid GPIO code: {0:?} (expected 5 characters)")]
    InvalidGpioCode(String),

    #[error("Invalid GPIO bit: {0} (expected 0-4)")]
    InvalidBit(usize),

    #[error("Invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl Error {
    pub fn key_not_found(kind: ResourceKind, key: impl ToString) -> Self {
        Error::KeyNotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn invalid_field(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias for dsync core operations
pub type Result<T> = std::result::Result<T, Error>;
