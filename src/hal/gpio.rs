//! Single GPIO output pin on a borrowed [`RegisterBank`].
//!
//! Level is written through on every call, never cached. The pin is put in
//! output mode and driven low once, at construction, so every later level
//! write lands on a configured output.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::registers::{Function, RegisterBank};
use crate::error::{LedError, Result};

/// Highest pin number in the BCM2835 GPIO bank.
pub const MAX_PIN: u8 = 53;

/// GPIO pin configured as an output.
pub struct GpioPin<'b> {
    bank: &'b RegisterBank,
    pin: u8,
}

impl<'b> GpioPin<'b> {
    /// Configure `pin` as output and drive it low.
    pub fn output(bank: &'b RegisterBank, pin: u8) -> Result<Self> {
        if pin > MAX_PIN {
            return Err(LedError::InvalidPin(pin));
        }

        bank.configure_output(pin);
        bank.set_low(pin);

        Ok(Self { bank, pin })
    }

    /// Pin number.
    #[inline]
    pub fn number(&self) -> u8 {
        self.pin
    }

    /// Current function as read back from the bank.
    pub fn function(&self) -> Function {
        self.bank.function(self.pin)
    }
}

impl ErrorType for GpioPin<'_> {
    type Error = Infallible;
}

impl OutputPin for GpioPin<'_> {
    #[inline]
    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.bank.set_high(self.pin);
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.bank.set_low(self.pin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_configures_and_clears() {
        let bank = RegisterBank::simulated();
        let pin = GpioPin::output(&bank, 18).unwrap();

        assert_eq!(pin.function(), Function::Output);
        assert_eq!(bank.snapshot().clr[0], 1 << 18);
    }

    #[test]
    fn test_rejects_pin_out_of_range() {
        let bank = RegisterBank::simulated();
        assert!(matches!(
            GpioPin::output(&bank, 54),
            Err(LedError::InvalidPin(54))
        ));
    }

    #[test]
    fn test_high_pin_uses_second_bank_word() {
        let bank = RegisterBank::simulated();
        let mut pin = GpioPin::output(&bank, 40).unwrap();

        pin.set_high().unwrap();
        let regs = bank.snapshot();
        assert_eq!(regs.set[1], 1 << 8);
        assert_eq!(regs.set[0], 0);
    }
}
