//! Word segmentation across chunked input.
//!
//! Text reaches the encoder in pieces of arbitrary size, so a word (or the
//! gap after it) can be cut anywhere. The encoder never decides a word has
//! ended until it sees a boundary byte or the message is finished, and it
//! pays the inter-word gap in two parts:
//!
//! - 2u when the word ends,
//! - 5u just before the next word of the same message starts.
//!
//! A message split as `"HEL"` + `"LO"` therefore keys exactly like
//! `"HELLO"`, and `"HI"` + `" THERE"` exactly like `"HI THERE"`.
//!
//! Letters and digits are characters; every other byte is a boundary.
//! A NUL byte ends its chunk.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::morse::{is_encodable, lookup};
use crate::transmitter::{Transmitter, WORD_END_UNITS, WORD_LEAD_UNITS};
use crate::{tx_debug, tx_trace};

/// Segmentation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// No word sent yet in this message.
    Idle,
    /// Scanning a word; its end gap is still owed.
    InWord,
    /// Skipping boundary bytes; the lead-in gap is owed to the next word.
    Boundary,
}

/// What one chunk produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Bytes consumed, NUL and anything after it included.
    pub consumed: usize,
    /// Characters keyed.
    pub characters: u32,
    /// Words started.
    pub words: u32,
}

/// Segmentation state machine feeding a [`Transmitter`].
#[derive(Debug)]
pub struct StreamEncoder {
    state: State,
}

impl StreamEncoder {
    /// New encoder, idle.
    pub const fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Key one chunk. `start` marks the first chunk of a message; any gap
    /// still owed by a previous unfinished message is paid first.
    pub fn process<P, D>(&mut self, tx: &mut Transmitter<P, D>, chunk: &[u8], start: bool) -> ChunkReport
    where
        P: OutputPin<Error = Infallible>,
        D: DelayNs,
    {
        if start {
            self.finish(tx);
        }

        let text = match chunk.iter().position(|&b| b == 0) {
            Some(end) => &chunk[..end],
            None => chunk,
        };

        let mut report = ChunkReport {
            consumed: chunk.len(),
            ..ChunkReport::default()
        };

        for &byte in text {
            if is_encodable(byte) {
                match self.state {
                    State::InWord => {}
                    State::Boundary => {
                        tx.pause(WORD_LEAD_UNITS);
                        report.words += 1;
                    }
                    State::Idle => report.words += 1,
                }

                tx_trace!("key '{}'", byte as char);
                tx.emit(lookup(byte));
                report.characters += 1;
                self.state = State::InWord;
            } else if self.state == State::InWord {
                tx.pause(WORD_END_UNITS);
                self.state = State::Boundary;
            }
        }

        tx_debug!(
            "chunk {} bytes, {} chars, state {:?}",
            report.consumed,
            report.characters,
            self.state
        );
        report
    }

    /// End the message: pay a word end still owed and go idle.
    pub fn finish<P, D>(&mut self, tx: &mut Transmitter<P, D>)
    where
        P: OutputPin<Error = Infallible>,
        D: DelayNs,
    {
        if self.state == State::InWord {
            tx.pause(WORD_END_UNITS);
        }
        self.state = State::Idle;
    }
}

impl Default for StreamEncoder {
    fn default() -> Self {
        Self::new()
    }
}
