//! Timed keying of one character at a time.
//!
//! ```text
//!  Dot        Dash                 char tail
//!  ┌─┐ gap    ┌───┐ gap
//! ─┘ └─1u─────┘ 3u└─1u──────── 2u ──────────▶
//!   1u
//! ```
//!
//! Every symbol is followed by a 1u gap, the last one included, and every
//! character ends with 2u more. Between two characters the line is therefore
//! low for exactly 3u. The 2u tail is paid even for an empty code.

use core::convert::Infallible;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::MorseConfig;
use crate::morse::{Code, Symbol};

/// Gap after each symbol, in units.
pub const SYMBOL_GAP_UNITS: u32 = 1;

/// Extra gap after a character, completing the 3u character space.
pub const CHAR_TAIL_UNITS: u32 = 2;

/// Gap paid when a word ends.
pub const WORD_END_UNITS: u32 = 2;

/// Gap paid before the next word starts.
pub const WORD_LEAD_UNITS: u32 = 5;

/// Drives one output through timed Morse pulses.
///
/// The unit is read from the shared [`MorseConfig`] at each pulse and each
/// pause, so a change made while a message is being sent applies from the
/// next boundary on.
///
/// Dropping the transmitter drives the pin low.
pub struct Transmitter<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    pin: P,
    delay: D,
    config: Arc<MorseConfig>,
}

impl<P, D> Transmitter<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Create a transmitter on an already configured output.
    pub fn new(pin: P, delay: D, config: Arc<MorseConfig>) -> Self {
        Self { pin, delay, config }
    }

    /// Shared configuration handle.
    #[inline]
    pub fn config(&self) -> &Arc<MorseConfig> {
        &self.config
    }

    #[inline]
    fn key(&mut self, down: bool) {
        let result = if down { self.pin.set_high() } else { self.pin.set_low() };
        result.unwrap_or_else(|never| match never {})
    }

    /// Hold the current level for `units` time units.
    #[inline]
    pub fn pause(&mut self, units: u32) {
        let ms = units.saturating_mul(self.config.unit_ms());
        self.delay.delay_ms(ms);
    }

    fn pulse(&mut self, symbol: Symbol) {
        self.key(true);
        self.pause(symbol.units());
        self.key(false);
    }

    /// Send one character's code followed by the character tail.
    pub fn emit(&mut self, code: Code) {
        for &symbol in code {
            self.pulse(symbol);
            self.pause(SYMBOL_GAP_UNITS);
        }
        self.pause(CHAR_TAIL_UNITS);
    }
}

impl<P, D> Drop for Transmitter<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    fn drop(&mut self) {
        self.key(false);
    }
}

/// Time units taken by [`Transmitter::emit`] for `code`.
pub fn emit_units(code: Code) -> u32 {
    crate::morse::on_units(code) + code.len() as u32 * SYMBOL_GAP_UNITS + CHAR_TAIL_UNITS
}
