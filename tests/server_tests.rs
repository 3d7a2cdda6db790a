//! Sink server loop tests

mod common;

use std::io::{self, ErrorKind, Read};
use std::sync::atomic::AtomicBool;

use common::{device, take};
use rust_morse_led::server::serve_reader;

/// Hands out one scripted result per `read` call.
struct Scripted {
    reads: Vec<io::Result<&'static [u8]>>,
}

impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.reads.is_empty() {
            return Ok(0);
        }
        let data = self.reads.remove(0)?;
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

#[test]
fn test_each_read_is_one_write() {
    let (device, _timeline) = device();
    let mut reader = Scripted {
        reads: vec![Ok(&b"HI THERE"[..]), Ok(&b"SOS"[..])],
    };

    let keyed = serve_reader(&device, &mut reader, &AtomicBool::new(false)).unwrap();
    assert_eq!(keyed, 11);

    let s = device.stats().snapshot();
    assert_eq!(s.writes, 2);
    assert_eq!(s.words, 3);
}

#[test]
fn test_interrupted_read_is_retried() {
    let (device, _timeline) = device();
    let mut reader = Scripted {
        reads: vec![Err(ErrorKind::Interrupted.into()), Ok(&b"E"[..])],
    };

    assert_eq!(serve_reader(&device, &mut reader, &AtomicBool::new(false)).unwrap(), 1);
}

#[test]
fn test_read_error_is_returned() {
    let (device, _timeline) = device();
    let mut reader = Scripted {
        reads: vec![Ok(&b"E"[..]), Err(ErrorKind::BrokenPipe.into())],
    };

    let err = serve_reader(&device, &mut reader, &AtomicBool::new(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    assert_eq!(device.stats().snapshot().writes, 1);
}

#[test]
fn test_stop_discards_wake_byte() {
    let (device, timeline) = device();
    let mut reader = Scripted {
        reads: vec![Ok(&b"\n"[..]), Ok(&b"SOS"[..])],
    };

    let keyed = serve_reader(&device, &mut reader, &AtomicBool::new(true)).unwrap();
    assert_eq!(keyed, 0);
    assert!(take(&timeline).is_empty());
}
