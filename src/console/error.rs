//! Console error types

use crate::config::ParamSetError;

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Unknown command
    UnknownCommand,
    /// E02: Invalid value format
    InvalidValue,
    /// E03: Missing required argument
    MissingArg,
    /// E04: Value out of allowed range
    OutOfRange,
    /// E05: Parameter cannot be changed at runtime
    ReadOnly,
    /// E06: Unknown parameter
    UnknownParam,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::MissingArg => "E03",
            Self::OutOfRange => "E04",
            Self::ReadOnly => "E05",
            Self::UnknownParam => "E06",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::InvalidValue => "invalid value",
            Self::MissingArg => "missing argument",
            Self::OutOfRange => "out of range",
            Self::ReadOnly => "read-only parameter",
            Self::UnknownParam => "unknown parameter",
        }
    }
}

impl From<ParamSetError> for ConsoleError {
    fn from(e: ParamSetError) -> Self {
        match e {
            ParamSetError::InvalidValue => Self::InvalidValue,
            ParamSetError::BelowMinimum | ParamSetError::AboveMaximum => Self::OutOfRange,
            ParamSetError::ReadOnly => Self::ReadOnly,
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ConsoleError {}
