//! Device write path tests: chunking, short reads, stats, serialization

mod common;

use std::thread;

use common::{device, on_time, take, transmitter, Event, UNIT};
use rust_morse_led::device::CHUNK_SIZE;
use rust_morse_led::encoder::StreamEncoder;

const PANGRAM: &str = "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG 0123456789 \
                       the quick brown fox jumps over the lazy dog";

/// Reference keying: the whole text as a single chunk.
fn key_whole(text: &str) -> Vec<Event> {
    let (mut tx, timeline) = transmitter();
    let mut encoder = StreamEncoder::new();
    encoder.process(&mut tx, text.as_bytes(), true);
    encoder.finish(&mut tx);
    take(&timeline)
}

#[test]
fn test_write_returns_length() {
    let (device, _timeline) = device();
    assert_eq!(device.write(b"HI THERE"), 8);
    assert_eq!(device.write(b""), 0);
}

#[test]
fn test_long_write_keys_like_one_chunk() {
    assert!(PANGRAM.len() > CHUNK_SIZE * 2);

    let (device, timeline) = device();
    assert_eq!(device.write(PANGRAM.as_bytes()), PANGRAM.len());
    assert_eq!(take(&timeline), key_whole(PANGRAM));
}

#[test]
fn test_short_read_returns_consumed() {
    let (device, timeline) = device();
    let text = [b'E'; 70];
    let mut src: &[u8] = &text;

    // Second chunk wants 63 bytes, only 7 are there
    let written = device.write_from(&mut src, 126);
    assert_eq!(written, CHUNK_SIZE);

    // The first chunk was keyed in full
    let events = take(&timeline);
    assert_eq!(on_time(&events), CHUNK_SIZE as u32 * UNIT);

    let stats = device.stats().snapshot();
    assert_eq!(stats.short_writes, 1);
    assert_eq!(stats.bytes, CHUNK_SIZE as u64);
}

#[test]
fn test_stats_count_words_and_characters() {
    let (device, _timeline) = device();
    device.write(b"HI THERE");
    device.write(b"  SOS  ");

    let s = device.stats().snapshot();
    assert_eq!(s.writes, 2);
    assert_eq!(s.bytes, 15);
    assert_eq!(s.characters, 10);
    assert_eq!(s.words, 3);
    assert_eq!(s.short_writes, 0);
}

#[test]
fn test_each_write_is_its_own_message() {
    let (device, timeline) = device();
    device.write(b"E");
    device.write(b"E");

    // No 5u lead between messages, only the 2u word end of each
    let mut expected = key_whole("E");
    expected.extend(key_whole("E"));
    assert_eq!(take(&timeline), expected);
}

#[test]
fn test_concurrent_writes_do_not_interleave() {
    let (device, timeline) = device();

    thread::scope(|s| {
        s.spawn(|| device.write(b"EEEEEEEE"));
        s.spawn(|| device.write(b"TTTTTTTT"));
    });

    // Key-down lengths in order: one message's run, then the other's
    let events = take(&timeline);
    let mut holds = Vec::new();
    for pair in events.windows(2) {
        if let [Event::High, Event::Wait(ms)] = pair {
            holds.push(ms / UNIT);
        }
    }
    assert_eq!(holds.len(), 16);
    let first = holds[0];
    assert!(holds[..8].iter().all(|&h| h == first));
    assert!(holds[8..].iter().all(|&h| h != first));
    assert_eq!(device.stats().snapshot().writes, 2);
}

#[test]
fn test_drop_drives_pin_low() {
    let (device, timeline) = device();
    device.write(b"T");
    take(&timeline);

    drop(device);
    assert_eq!(take(&timeline), vec![Event::Low]);
}

#[test]
fn test_unit_change_applies_to_next_write() {
    let (device, timeline) = device();
    device.config().set_unit_ms(200).unwrap();
    device.write(b"E");

    let events = take(&timeline);
    assert_eq!(on_time(&events), 200);
}
