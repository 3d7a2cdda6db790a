//! International Morse table for letters and digits.
//!
//! Anything else maps to the empty code. Callers treat those bytes as word
//! boundaries, never as characters to send.

/// Keying symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// Key-down length in time units.
    #[inline]
    pub fn units(self) -> u32 {
        match self {
            Symbol::Dot => 1,
            Symbol::Dash => 3,
        }
    }

    /// Conventional printable form.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }
}

/// Symbol sequence for one character.
pub type Code = &'static [Symbol];

use Symbol::{Dash as Dah, Dot as Dit};

const EMPTY: Code = &[];

const LETTERS: [Code; 26] = [
    &[Dit, Dah],                  // A
    &[Dah, Dit, Dit, Dit],        // B
    &[Dah, Dit, Dah, Dit],        // C
    &[Dah, Dit, Dit],             // D
    &[Dit],                       // E
    &[Dit, Dit, Dah, Dit],        // F
    &[Dah, Dah, Dit],             // G
    &[Dit, Dit, Dit, Dit],        // H
    &[Dit, Dit],                  // I
    &[Dit, Dah, Dah, Dah],        // J
    &[Dah, Dit, Dah],             // K
    &[Dit, Dah, Dit, Dit],        // L
    &[Dah, Dah],                  // M
    &[Dah, Dit],                  // N
    &[Dah, Dah, Dah],             // O
    &[Dit, Dah, Dah, Dit],        // P
    &[Dah, Dah, Dit, Dah],        // Q
    &[Dit, Dah, Dit],             // R
    &[Dit, Dit, Dit],             // S
    &[Dah],                       // T
    &[Dit, Dit, Dah],             // U
    &[Dit, Dit, Dit, Dah],        // V
    &[Dit, Dah, Dah],             // W
    &[Dah, Dit, Dit, Dah],        // X
    &[Dah, Dit, Dah, Dah],        // Y
    &[Dah, Dah, Dit, Dit],        // Z
];

const DIGITS: [Code; 10] = [
    &[Dah, Dah, Dah, Dah, Dah],   // 0
    &[Dit, Dah, Dah, Dah, Dah],   // 1
    &[Dit, Dit, Dah, Dah, Dah],   // 2
    &[Dit, Dit, Dit, Dah, Dah],   // 3
    &[Dit, Dit, Dit, Dit, Dah],   // 4
    &[Dit, Dit, Dit, Dit, Dit],   // 5
    &[Dah, Dit, Dit, Dit, Dit],   // 6
    &[Dah, Dah, Dit, Dit, Dit],   // 7
    &[Dah, Dah, Dah, Dit, Dit],   // 8
    &[Dah, Dah, Dah, Dah, Dit],   // 9
];

/// True for bytes that carry a Morse character.
#[inline]
pub fn is_encodable(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Look up the code for `byte`, case-insensitively.
pub fn lookup(byte: u8) -> Code {
    match byte {
        b'a'..=b'z' => LETTERS[(byte - b'a') as usize],
        b'A'..=b'Z' => LETTERS[(byte - b'A') as usize],
        b'0'..=b'9' => DIGITS[(byte - b'0') as usize],
        _ => EMPTY,
    }
}

/// Key-down units of a code, excluding gaps.
pub fn on_units(code: Code) -> u32 {
    code.iter().map(|s| s.units()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(code: Code) -> String {
        code.iter().map(|s| s.as_char()).collect()
    }

    #[test]
    fn test_lookup_examples() {
        assert_eq!(render(lookup(b'A')), ".-");
        assert_eq!(render(lookup(b's')), "...");
        assert_eq!(render(lookup(b'0')), "-----");
        assert_eq!(render(lookup(b'9')), "----.");
    }

    #[test]
    fn test_lookup_other_bytes_empty() {
        for b in [b' ', b'.', b'\n', 0u8, 0xFF, b'@', b'['] {
            assert!(lookup(b).is_empty(), "byte {:#04x}", b);
        }
    }

    #[test]
    fn test_on_units() {
        assert_eq!(on_units(lookup(b'A')), 4);
        assert_eq!(on_units(lookup(b'0')), 15);
        assert_eq!(on_units(EMPTY), 0);
    }
}
