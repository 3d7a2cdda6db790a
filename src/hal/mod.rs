//! Hardware Abstraction Layer for RustMorseLed.
//!
//! Thin wrappers around the GPIO register block.
//! Timing logic stays in core modules, HAL is just I/O.

pub mod delay;
pub mod gpio;
pub mod registers;

pub use delay::StdDelay;
pub use gpio::{GpioPin, MAX_PIN};
pub use registers::{Function, GpioRegisterMap, RegisterBank, GPIO_BASE};
