//! Module: config
//!
//! Purpose: Configuration system for RustMorseLed.
//!
//! Architecture:
//! - `MorseConfig`: live values, shared by handle, atomically accessible
//! - `PARAMS`: descriptor table driving the console and attribute surfaces
//! - `settings`: startup settings loaded from a JSON file
//!
//! Safety: lock-free. The transmitter reads the unit on every pulse and
//! pause, so a `set` takes effect mid-transmission at the next boundary.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

pub mod settings;

pub use settings::Settings;

/// GPIO pin driving the LED.
pub const DEFAULT_PIN: u8 = 18;

/// Default time unit (dot length) in milliseconds.
pub const DEFAULT_UNIT_MS: u32 = 300;

/// Smallest accepted time unit in milliseconds.
pub const MIN_UNIT_MS: u32 = 100;

/// Live configuration shared between the console and the transmitter.
#[derive(Debug)]
pub struct MorseConfig {
    unit_ms: AtomicU32,
    pin: u8,
}

impl MorseConfig {
    /// Config for `pin` with the default unit.
    pub const fn new(pin: u8) -> Self {
        Self {
            unit_ms: AtomicU32::new(DEFAULT_UNIT_MS),
            pin,
        }
    }

    /// Config for `pin` with a validated unit.
    pub fn with_unit(pin: u8, unit_ms: u32) -> Result<Self, ParamSetError> {
        let config = Self::new(pin);
        config.set_unit_ms(unit_ms)?;
        Ok(config)
    }

    /// Current time unit in milliseconds.
    #[inline]
    pub fn unit_ms(&self) -> u32 {
        self.unit_ms.load(Ordering::Relaxed)
    }

    /// Replace the time unit. Values under [`MIN_UNIT_MS`] are rejected and
    /// leave the current value untouched.
    pub fn set_unit_ms(&self, unit_ms: u32) -> Result<(), ParamSetError> {
        if unit_ms < MIN_UNIT_MS {
            return Err(ParamSetError::BelowMinimum);
        }
        self.unit_ms.store(unit_ms, Ordering::Relaxed);
        Ok(())
    }

    /// LED pin number.
    #[inline]
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl Default for MorseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PIN)
    }
}

/// Parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    U8(u8),
    U32(u32),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::U8(n) => write!(f, "{}", n),
            ParamValue::U32(n) => write!(f, "{}", n),
        }
    }
}

/// Parameter type with its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    U8 { min: u8, max: u8 },
    U32 { min: u32, max: u32 },
}

impl ParamType {
    /// Parse decimal text (surrounding whitespace allowed) and range check.
    pub fn parse(&self, text: &str) -> Result<ParamValue, ParamSetError> {
        let text = text.trim();
        match *self {
            ParamType::U8 { min, max } => {
                let v: u8 = text.parse().map_err(|_| ParamSetError::InvalidValue)?;
                check_range(v, min, max).map(|_| ParamValue::U8(v))
            }
            ParamType::U32 { min, max } => {
                let v: u32 = text.parse().map_err(|_| ParamSetError::InvalidValue)?;
                check_range(v, min, max).map(|_| ParamValue::U32(v))
            }
        }
    }
}

fn check_range<T: PartialOrd>(v: T, min: T, max: T) -> Result<(), ParamSetError> {
    if v < min {
        Err(ParamSetError::BelowMinimum)
    } else if v > max {
        Err(ParamSetError::AboveMaximum)
    } else {
        Ok(())
    }
}

/// Why a parameter write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSetError {
    /// Not a decimal number of the right type.
    InvalidValue,
    /// Below the parameter's floor.
    BelowMinimum,
    /// Above the parameter's ceiling.
    AboveMaximum,
    /// Fixed at startup.
    ReadOnly,
}

impl fmt::Display for ParamSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParamSetError::InvalidValue => "invalid value",
            ParamSetError::BelowMinimum => "below minimum",
            ParamSetError::AboveMaximum => "above maximum",
            ParamSetError::ReadOnly => "read-only",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParamSetError {}

/// Parameter descriptor.
pub struct ParamDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub param_type: ParamType,
    pub get_fn: fn(&MorseConfig) -> ParamValue,
    pub set_fn: Option<fn(&MorseConfig, ParamValue) -> Result<(), ParamSetError>>,
}

impl ParamDescriptor {
    /// Parse `text` and apply it.
    pub fn set_from_str(&self, config: &MorseConfig, text: &str) -> Result<ParamValue, ParamSetError> {
        let set_fn = self.set_fn.ok_or(ParamSetError::ReadOnly)?;
        let value = self.param_type.parse(text)?;
        set_fn(config, value)?;
        Ok(value)
    }

    /// Current value.
    #[inline]
    pub fn get(&self, config: &MorseConfig) -> ParamValue {
        (self.get_fn)(config)
    }
}

fn get_interval(c: &MorseConfig) -> ParamValue {
    ParamValue::U32(c.unit_ms())
}

fn set_interval(c: &MorseConfig, v: ParamValue) -> Result<(), ParamSetError> {
    match v {
        ParamValue::U32(ms) => c.set_unit_ms(ms),
        ParamValue::U8(_) => Err(ParamSetError::InvalidValue),
    }
}

fn get_pin(c: &MorseConfig) -> ParamValue {
    ParamValue::U8(c.pin())
}

/// All parameters.
pub static PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "interval",
        brief: "Time unit in ms (dot length)",
        param_type: ParamType::U32 { min: MIN_UNIT_MS, max: u32::MAX },
        get_fn: get_interval,
        set_fn: Some(set_interval),
    },
    ParamDescriptor {
        name: "pin",
        brief: "LED GPIO pin",
        param_type: ParamType::U8 { min: 0, max: crate::hal::gpio::MAX_PIN },
        get_fn: get_pin,
        set_fn: None,
    },
];

/// Find a parameter by exact name.
pub fn find_param(name: &str) -> Option<&'static ParamDescriptor> {
    PARAMS.iter().find(|p| p.name == name)
}

/// Parameters whose name starts with `pattern` minus its trailing `*`.
pub fn find_params_matching(pattern: &str) -> impl Iterator<Item = &'static ParamDescriptor> + '_ {
    let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
    PARAMS.iter().filter(move |p| p.name.starts_with(prefix))
}
