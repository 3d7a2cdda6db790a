//! Startup settings.
//!
//! Loaded once from an optional JSON file; every field has a default, so an
//! empty object (or no file at all) gives the stock Pi setup:
//!
//! ```json
//! {
//!     "pin": 18,
//!     "unit_ms": 300,
//!     "mem_device": "/dev/mem",
//!     "gpio_base": 538968064,
//!     "sink_path": "/dev/leddy0",
//!     "apply_sink_mode": true,
//!     "attribute_path": "/run/leddy0/interval"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{MorseConfig, DEFAULT_PIN, DEFAULT_UNIT_MS, MIN_UNIT_MS};
use crate::error::{LedError, Result};
use crate::hal::gpio::MAX_PIN;
use crate::hal::registers::GPIO_BASE;

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// LED pin.
    pub pin: u8,
    /// Initial time unit in ms.
    pub unit_ms: u32,
    /// Memory device the register block is mapped from.
    pub mem_device: PathBuf,
    /// Physical offset of the GPIO block within `mem_device`.
    pub gpio_base: u64,
    /// FIFO the text sink reads from.
    pub sink_path: PathBuf,
    /// Chmod the sink to the write-only mode at startup.
    pub apply_sink_mode: bool,
    /// File the interval attribute is published to, if any.
    pub attribute_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN,
            unit_ms: DEFAULT_UNIT_MS,
            mem_device: PathBuf::from("/dev/mem"),
            gpio_base: GPIO_BASE,
            sink_path: PathBuf::from("/dev/leddy0"),
            apply_sink_mode: true,
            attribute_path: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check ranges the JSON types cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.pin > MAX_PIN {
            return Err(LedError::InvalidPin(self.pin));
        }
        if self.unit_ms < MIN_UNIT_MS {
            return Err(LedError::UnitTooSmall(self.unit_ms));
        }
        Ok(())
    }

    /// Live config seeded from these settings.
    pub fn morse_config(&self) -> Result<MorseConfig> {
        MorseConfig::with_unit(self.pin, self.unit_ms).map_err(|_| LedError::UnitTooSmall(self.unit_ms))
    }
}
