//! The LED device: one transmitter, its encoder, and the write sink.
//!
//! Built once at startup and shared by reference with the sink server and
//! the console. A write call holds the transmit lock from its first chunk to
//! its last, so concurrent writers are keyed one after another, in arrival
//! order, never interleaved.

use core::convert::Infallible;
use std::io::Read;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::MorseConfig;
use crate::encoder::StreamEncoder;
use crate::stats::Stats;
use crate::sync::FifoMutex;
use crate::transmitter::Transmitter;
use crate::{tx_info, tx_warn};

/// Bytes copied from the caller per chunk.
pub const CHUNK_SIZE: usize = 63;

struct Engine<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    transmitter: Transmitter<P, D>,
    encoder: StreamEncoder,
}

/// LED Morse device.
pub struct Device<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    config: Arc<MorseConfig>,
    engine: FifoMutex<Engine<P, D>>,
    stats: Stats,
}

impl<P, D> Device<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    pub fn new(transmitter: Transmitter<P, D>) -> Self {
        Self {
            config: Arc::clone(transmitter.config()),
            engine: FifoMutex::new(Engine {
                transmitter,
                encoder: StreamEncoder::new(),
            }),
            stats: Stats::new(),
        }
    }

    /// Shared configuration handle.
    pub fn config(&self) -> &Arc<MorseConfig> {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Key up to `count` bytes read from `src` as one message.
    ///
    /// Input is pulled in [`CHUNK_SIZE`] pieces. If a piece cannot be read
    /// in full, processing stops there and the bytes consumed so far are
    /// returned; that short count is the only sign of the failure.
    pub fn write_from<R: Read + ?Sized>(&self, src: &mut R, count: usize) -> usize {
        let mut guard = self.engine.lock();
        let Engine { transmitter, encoder } = &mut *guard;

        let mut chunk = [0u8; CHUNK_SIZE];
        let mut offset = 0;
        let mut characters = 0;
        let mut words = 0;
        let mut short = false;

        tx_info!("write {} bytes, unit {} ms", count, self.config.unit_ms());

        while offset < count {
            let size = (count - offset).min(CHUNK_SIZE);
            if let Err(e) = src.read_exact(&mut chunk[..size]) {
                tx_warn!("short write after {} of {} bytes: {}", offset, count, e);
                short = true;
                break;
            }
            let report = encoder.process(transmitter, &chunk[..size], offset == 0);
            characters += report.characters;
            words += report.words;
            offset += size;
        }

        encoder.finish(transmitter);

        self.stats.record_write(offset, characters, words, short);
        offset
    }

    /// Key `buf` as one message. Returns `buf.len()`.
    pub fn write(&self, buf: &[u8]) -> usize {
        let mut src = buf;
        self.write_from(&mut src, buf.len())
    }
}
