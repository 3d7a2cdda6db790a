//! Recording pin and virtual clock shared by the integration tests.
//!
//! Both write into one timeline, so a test sees levels and waits in the
//! exact order the transmitter issued them.

#![allow(dead_code)]

use core::convert::Infallible;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use rust_morse_led::config::{MorseConfig, DEFAULT_PIN};
use rust_morse_led::device::Device;
use rust_morse_led::transmitter::Transmitter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    High,
    Low,
    /// Milliseconds waited.
    Wait(u32),
}

pub type Timeline = Arc<Mutex<Vec<Event>>>;

pub struct MockPin {
    timeline: Timeline,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.timeline.lock().unwrap().push(Event::High);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.timeline.lock().unwrap().push(Event::Low);
        Ok(())
    }
}

/// Records waits instead of sleeping.
pub struct MockDelay {
    timeline: Timeline,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.lock().unwrap().push(Event::Wait(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timeline.lock().unwrap().push(Event::Wait(ms));
    }
}

pub type MockTransmitter = Transmitter<MockPin, MockDelay>;
pub type MockDevice = Device<MockPin, MockDelay>;

/// Unit used by [`transmitter`] and [`device`].
pub const UNIT: u32 = 100;

/// Transmitter at [`UNIT`] ms.
pub fn transmitter() -> (MockTransmitter, Timeline) {
    transmitter_with(Arc::new(MorseConfig::with_unit(DEFAULT_PIN, UNIT).unwrap()))
}

pub fn transmitter_with(config: Arc<MorseConfig>) -> (MockTransmitter, Timeline) {
    let timeline = Timeline::default();
    let tx = Transmitter::new(
        MockPin { timeline: Arc::clone(&timeline) },
        MockDelay { timeline: Arc::clone(&timeline) },
        config,
    );
    (tx, timeline)
}

pub fn device() -> (MockDevice, Timeline) {
    let (tx, timeline) = transmitter();
    (Device::new(tx), timeline)
}

/// Compact rendering, e.g. `"+ 1 - 1 2"`, with waits in units of `unit`.
pub fn render(events: &[Event], unit: u32) -> String {
    events
        .iter()
        .map(|e| match e {
            Event::High => "+".to_string(),
            Event::Low => "-".to_string(),
            Event::Wait(ms) => (ms / unit).to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sum of all waits, in ms.
pub fn total_wait(events: &[Event]) -> u32 {
    events
        .iter()
        .map(|e| match e {
            Event::Wait(ms) => *ms,
            _ => 0,
        })
        .sum()
}

/// Sum of waits while the pin is high, in ms.
pub fn on_time(events: &[Event]) -> u32 {
    let mut high = false;
    let mut total = 0;
    for e in events {
        match e {
            Event::High => high = true,
            Event::Low => high = false,
            Event::Wait(ms) if high => total += ms,
            Event::Wait(_) => {}
        }
    }
    total
}

pub fn take(timeline: &Timeline) -> Vec<Event> {
    std::mem::take(&mut *timeline.lock().unwrap())
}
