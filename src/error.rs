//! Error types for RustMorseLed.
//!
//! Only startup can fail hard. Once the register block is mapped and the
//! pin configured, transmission itself has no failure path.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for startup and surface operations.
#[derive(Debug, Error)]
pub enum LedError {
    /// I/O error on a device or sink file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The GPIO register block could not be mapped.
    #[error("cannot map GPIO registers from {path} at {base:#010x}: {source}")]
    Map {
        path: PathBuf,
        base: u64,
        #[source]
        source: std::io::Error,
    },

    /// Pin index outside the GPIO bank.
    #[error("invalid GPIO pin {0} (valid range 0..={max})", max = crate::hal::gpio::MAX_PIN)]
    InvalidPin(u8),

    /// Time unit below the floor.
    #[error("time unit {0} ms is below the minimum of {min} ms", min = crate::config::MIN_UNIT_MS)]
    UnitTooSmall(u32),

    /// Settings file could not be parsed.
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// The text sink node does not exist.
    #[error("sink {0} does not exist (create it with mkfifo)")]
    SinkMissing(PathBuf),
}

/// Result type alias using LedError.
pub type Result<T> = std::result::Result<T, LedError>;
