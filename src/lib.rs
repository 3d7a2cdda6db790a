//! # RustMorseLed
//!
//! Blinks text as Morse code on an LED wired to a Raspberry Pi GPIO pin.
//!
//! ## Architecture
//!
//! ```text
//! sink (FIFO) ─▶ Device ─▶ StreamEncoder ─▶ morse table ─▶ Transmitter ─▶ GpioPin
//!                  │                                           │
//!             FifoMutex                               MorseConfig.unit_ms
//!                                                              ▲
//! console (stdin) ─────────────── set interval ────────────────┘
//! ```
//!
//! - The transmitter only sees `embedded_hal` traits, so host tests drive it
//!   with a recording pin and a virtual clock.
//! - One write call holds the device lock end to end. Writers queue in
//!   arrival order.
//! - The time unit is a single atomic, read at every pulse and pause.

pub mod config;
pub mod console;
pub mod control;
pub mod device;
pub mod encoder;
pub mod error;
pub mod hal;
pub mod logging;
pub mod morse;
pub mod server;
pub mod stats;
pub mod sync;
pub mod transmitter;

pub use config::{MorseConfig, Settings, PARAMS};
pub use device::Device;
pub use encoder::StreamEncoder;
pub use error::{LedError, Result};
pub use hal::{GpioPin, RegisterBank, StdDelay};
pub use stats::{Stats, StatsSnapshot};
pub use transmitter::Transmitter;
