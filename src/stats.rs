//! Transmission counters.
//!
//! Updated once per write call by the sink, read by the console `stats`
//! command. Lock-free; a snapshot is not atomic across counters.

use core::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters since startup.
#[derive(Debug, Default)]
pub struct Stats {
    writes: AtomicU64,
    bytes: AtomicU64,
    characters: AtomicU64,
    words: AtomicU64,
    short_writes: AtomicU64,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            writes: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            characters: AtomicU64::new(0),
            words: AtomicU64::new(0),
            short_writes: AtomicU64::new(0),
        }
    }

    /// Account one write call.
    pub fn record_write(&self, bytes: usize, characters: u32, words: u32, short: bool) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.characters.fetch_add(characters as u64, Ordering::Relaxed);
        self.words.fetch_add(words as u64, Ordering::Relaxed);
        if short {
            self.short_writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            characters: self.characters.load(Ordering::Relaxed),
            words: self.words.load(Ordering::Relaxed),
            short_writes: self.short_writes.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub writes: u64,
    pub bytes: u64,
    pub characters: u64,
    pub words: u64,
    pub short_writes: u64,
}
