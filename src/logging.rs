//! Non-blocking logging for the transmit path.
//!
//! # Architecture
//!
//! ```text
//! Writer threads          TxLogRing            Drain thread
//! ──────────────          ─────────            ────────────
//!
//! tx_info!() ──────────▶ [E0][E1][E2] ──────▶ tracing events
//! no syscalls             bounded ring         blocking ok
//! never waits             drops when full
//! ```
//!
//! The transmit path sleeps for precise pulse lengths; a log call must not
//! add a write to stderr in the middle of a dash. Those calls format into a
//! fixed slot and return. The drain thread replays slots through `tracing`
//! under the `morse_led::tx` target.
//!
//! Everything outside the transmit path logs with `tracing` directly.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use tracing::Level;

/// Bytes kept per message; longer text is cut.
pub const MAX_MSG_LEN: usize = 120;

/// Ring capacity in entries.
pub const LOG_BUFFER_SIZE: usize = 256;

/// How often the drain thread polls the ring.
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

/// One queued message.
#[derive(Clone, Copy)]
pub struct TxLogEntry {
    /// Microseconds since the first log call of the process.
    pub timestamp_us: u64,
    pub level: Level,
    len: u8,
    text: [u8; MAX_MSG_LEN],
}

impl TxLogEntry {
    const BLANK: Self = Self {
        timestamp_us: 0,
        level: Level::INFO,
        len: 0,
        text: [0; MAX_MSG_LEN],
    };

    /// Message text. A multibyte character split by the cut is dropped.
    pub fn message(&self) -> &str {
        let bytes = &self.text[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

/// Formats into a fixed slot, silently cutting at the end.
struct SlotWriter<'a> {
    out: &'a mut [u8],
    filled: usize,
}

impl fmt::Write for SlotWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.out.len() - self.filled;
        let n = s.len().min(room);
        self.out[self.filled..self.filled + n].copy_from_slice(&s.as_bytes()[..n]);
        self.filled += n;
        Ok(())
    }
}

/// Render `args` into `out`, returning the byte count.
pub fn render_into(out: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut w = SlotWriter { out, filled: 0 };
    let _ = fmt::write(&mut w, args);
    w.filled
}

struct Slot {
    seq: AtomicU32,
    entry: UnsafeCell<TxLogEntry>,
}

/// Bounded multi-producer, single-consumer ring.
///
/// Each slot carries a sequence number. A producer claims a slot by
/// advancing `head` only when the slot is free, fills it, then publishes
/// it by bumping the sequence. The consumer only reads published slots.
/// A full ring drops the message and counts it.
pub struct TxLogRing<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    head: AtomicU32,
    tail: AtomicU32,
    lost: AtomicU32,
}

// SAFETY: a slot's entry is only written by the producer that won the CAS on
// `head` for it and only read by the single consumer after the Release store
// of its sequence.
unsafe impl<const N: usize> Sync for TxLogRing<N> {}
unsafe impl<const N: usize> Send for TxLogRing<N> {}

impl<const N: usize> TxLogRing<N> {
    const MASK: u32 = (N - 1) as u32;

    pub fn new() -> Self {
        assert!(N.is_power_of_two(), "ring capacity must be a power of two");

        Self {
            slots: core::array::from_fn(|i| Slot {
                seq: AtomicU32::new(i as u32),
                entry: UnsafeCell::new(TxLogEntry::BLANK),
            }),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            lost: AtomicU32::new(0),
        }
    }

    /// Queue a message. Never blocks; returns `false` if the ring was full.
    pub fn push(&self, timestamp_us: u64, level: Level, msg: &[u8]) -> bool {
        let mut pos = self.head.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[(pos & Self::MASK) as usize];
            let lag = slot.seq.load(Ordering::Acquire).wrapping_sub(pos) as i32;

            if lag < 0 {
                self.lost.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            if lag > 0 {
                pos = self.head.load(Ordering::Relaxed);
                continue;
            }

            match self
                .head
                .compare_exchange_weak(pos, pos.wrapping_add(1), Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => {
                    let n = msg.len().min(MAX_MSG_LEN);
                    // SAFETY: the CAS made this producer the only writer of the slot.
                    let entry = unsafe { &mut *slot.entry.get() };
                    entry.timestamp_us = timestamp_us;
                    entry.level = level;
                    entry.len = n as u8;
                    entry.text[..n].copy_from_slice(&msg[..n]);

                    slot.seq.store(pos.wrapping_add(1), Ordering::Release);
                    return true;
                }
                Err(current) => pos = current,
            }
        }
    }

    /// Take the oldest published entry. Single consumer only.
    pub fn pop(&self) -> Option<TxLogEntry> {
        let pos = self.tail.load(Ordering::Relaxed);
        let slot = &self.slots[(pos & Self::MASK) as usize];

        if slot.seq.load(Ordering::Acquire) != pos.wrapping_add(1) {
            return None;
        }

        // SAFETY: the slot is published and no producer can claim it again
        // until its sequence moves on below.
        let entry = unsafe { *slot.entry.get() };
        slot.seq.store(pos.wrapping_add(N as u32), Ordering::Release);
        self.tail.store(pos.wrapping_add(1), Ordering::Relaxed);
        Some(entry)
    }

    /// Messages dropped on a full ring since the last [`take_lost`](Self::take_lost).
    #[inline]
    pub fn lost(&self) -> u32 {
        self.lost.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn take_lost(&self) -> u32 {
        self.lost.swap(0, Ordering::Relaxed)
    }

    /// Entries claimed and not yet popped.
    #[inline]
    pub fn backlog(&self) -> u32 {
        let tail = self.tail.load(Ordering::Relaxed);
        self.head.load(Ordering::Acquire).wrapping_sub(tail)
    }
}

impl<const N: usize> Default for TxLogRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring used by the `tx_*` macros.
pub fn tx_log_ring() -> &'static TxLogRing {
    static RING: OnceLock<TxLogRing> = OnceLock::new();
    RING.get_or_init(TxLogRing::new)
}

/// Microseconds since the first call.
pub fn timestamp_us() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Replay one entry as a `tracing` event.
pub fn emit(entry: &TxLogEntry) {
    let t_us = entry.timestamp_us;
    let msg = entry.message();
    let level = entry.level;

    if level == Level::ERROR {
        tracing::error!(target: "morse_led::tx", t_us, "{}", msg);
    } else if level == Level::WARN {
        tracing::warn!(target: "morse_led::tx", t_us, "{}", msg);
    } else if level == Level::INFO {
        tracing::info!(target: "morse_led::tx", t_us, "{}", msg);
    } else if level == Level::DEBUG {
        tracing::debug!(target: "morse_led::tx", t_us, "{}", msg);
    } else {
        tracing::trace!(target: "morse_led::tx", t_us, "{}", msg);
    }
}

/// Replay everything queued. Returns how many entries went out.
pub fn forward<const N: usize>(ring: &TxLogRing<N>) -> usize {
    let mut count = 0;
    while let Some(entry) = ring.pop() {
        emit(&entry);
        count += 1;
    }

    let lost = ring.take_lost();
    if lost > 0 {
        tracing::warn!(lost, "transmit log overflow");
    }
    count
}

/// Body of the drain thread. Returns once `stop` is set and the ring is empty.
pub fn drain_task<const N: usize>(ring: &TxLogRing<N>, stop: &AtomicBool) {
    loop {
        let last_pass = stop.load(Ordering::Acquire);
        forward(ring);
        if last_pass {
            return;
        }
        thread::sleep(DRAIN_INTERVAL);
    }
}

/// Queue a message from the transmit path.
///
/// ```ignore
/// tx_log!(tracing::Level::INFO, "char {} -> {} symbols", c, n);
/// ```
#[macro_export]
macro_rules! tx_log {
    ($level:expr, $($arg:tt)*) => {{
        let mut text = [0u8; $crate::logging::MAX_MSG_LEN];
        let n = $crate::logging::render_into(&mut text, format_args!($($arg)*));
        $crate::logging::tx_log_ring().push($crate::logging::timestamp_us(), $level, &text[..n]);
    }};
}

#[macro_export]
macro_rules! tx_info {
    ($($arg:tt)*) => {
        $crate::tx_log!(::tracing::Level::INFO, $($arg)*)
    };
}

#[macro_export]
macro_rules! tx_warn {
    ($($arg:tt)*) => {
        $crate::tx_log!(::tracing::Level::WARN, $($arg)*)
    };
}

#[macro_export]
macro_rules! tx_debug {
    ($($arg:tt)*) => {
        $crate::tx_log!(::tracing::Level::DEBUG, $($arg)*)
    };
}

/// Per-character chatter; off unless the filter asks for trace.
#[macro_export]
macro_rules! tx_trace {
    ($($arg:tt)*) => {
        $crate::tx_log!(::tracing::Level::TRACE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages<const N: usize>(ring: &TxLogRing<N>) -> Vec<String> {
        core::iter::from_fn(|| ring.pop()).map(|e| e.message().to_owned()).collect()
    }

    #[test]
    fn test_push_then_pop() {
        let ring = TxLogRing::<8>::new();

        assert!(ring.push(42, Level::DEBUG, b"key 'S'"));
        assert_eq!(ring.backlog(), 1);

        let entry = ring.pop().unwrap();
        assert_eq!(entry.timestamp_us, 42);
        assert_eq!(entry.level, Level::DEBUG);
        assert_eq!(entry.message(), "key 'S'");
        assert!(ring.pop().is_none());
        assert_eq!(ring.backlog(), 0);
    }

    #[test]
    fn test_full_ring_drops_newest() {
        let ring = TxLogRing::<2>::new();

        assert!(ring.push(0, Level::INFO, b"write 5 bytes"));
        assert!(ring.push(1, Level::TRACE, b"key 'H'"));
        assert!(!ring.push(2, Level::TRACE, b"key 'I'"));
        assert_eq!(ring.lost(), 1);

        assert_eq!(ring.pop().unwrap().message(), "write 5 bytes");
        assert!(ring.push(3, Level::TRACE, b"key 'T'"));
        assert_eq!(messages(&ring), ["key 'H'", "key 'T'"]);
        assert_eq!(ring.take_lost(), 1);
        assert_eq!(ring.lost(), 0);
    }

    #[test]
    fn test_render_cuts_at_slot_end() {
        let mut out = [0u8; 12];
        let n = render_into(&mut out, format_args!("unit {} ms, chunk {}", 300, 63));
        assert_eq!(&out[..n], b"unit 300 ms,");
    }

    #[test]
    fn test_cut_inside_multibyte_char() {
        let ring = TxLogRing::<2>::new();
        let mut msg = vec![b'x'; MAX_MSG_LEN - 1];
        msg.extend_from_slice("é".as_bytes());
        ring.push(0, Level::WARN, &msg);

        assert_eq!(ring.pop().unwrap().message().len(), MAX_MSG_LEN - 1);
    }

    #[test]
    fn test_concurrent_writers_all_land() {
        let ring = TxLogRing::<64>::new();

        thread::scope(|s| {
            for w in 0..4 {
                let ring = &ring;
                s.spawn(move || {
                    for c in 0..10 {
                        let msg = format!("writer {} char {}", w, c);
                        assert!(ring.push(c, Level::TRACE, msg.as_bytes()));
                    }
                });
            }
        });

        assert_eq!(messages(&ring).len(), 40);
    }

    #[test]
    fn test_drain_task_empties_ring_before_stopping() {
        let ring = TxLogRing::<8>::new();
        ring.push(1, Level::WARN, b"short write after 63 of 126 bytes");
        ring.push(2, Level::TRACE, b"key 'E'");
        assert_eq!(forward(&ring), 2);

        ring.push(3, Level::INFO, b"write 1 bytes");
        drain_task(&ring, &AtomicBool::new(true));
        assert_eq!(ring.backlog(), 0);
    }

    #[test]
    fn test_macro_queues_on_shared_ring() {
        let ring = tx_log_ring();
        let (before, lost_before) = (ring.backlog(), ring.lost());
        tx_debug!("unit {} ms", 300);
        assert!(ring.backlog() > before || ring.lost() > lost_before);
    }
}
