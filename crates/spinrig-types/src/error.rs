//! Error types for data parsing in spinrig-types.

use thiserror::Error;

/// Errors that can occur when parsing relay or operator input.
///
/// This error type is platform-agnostic and does not include
/// process or I/O errors (those belong in spinrig-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The relay produced no output at all (helper script or library missing).
    #[error("Relay produced no output")]
    EmptyOutput,

    /// The sensor relay reported that the sensor could not be read.
    #[error("Sensor read failed")]
    ReadFailed,

    /// A field expected in the output was not present.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be parsed as a number.
    #[error("Invalid {field} value: {value:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },
}

impl ParseError {
    /// Create an invalid number error for a named field.
    pub fn invalid_number(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias using spinrig-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
