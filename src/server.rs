//! Sink server: feeds bytes arriving on the LED sink to the device.
//!
//! The sink is a named pipe. Every `read` that returns data is one write
//! call on the device, so what a client pushes in a single `write(2)` of up
//! to [`READ_BUF_SIZE`] bytes is keyed as one message. When the last writer
//! closes the pipe the server sees EOF and opens it again.

use core::convert::Infallible;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::device::Device;
use crate::error::Result;

/// Largest message taken from the sink in one read.
pub const READ_BUF_SIZE: usize = 4096;

/// Feed `reader` to `device` until EOF or until `stop` is seen.
///
/// Returns the number of bytes keyed.
pub fn serve_reader<P, D, R>(device: &Device<P, D>, reader: &mut R, stop: &AtomicBool) -> io::Result<u64>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
    R: Read + ?Sized,
{
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if stop.load(Ordering::Acquire) {
            return Ok(total);
        }

        let written = device.write(&buf[..n]);
        total += written as u64;
    }
}

/// Serve the named pipe at `path` until `stop` is set.
///
/// Opening the pipe blocks until a writer shows up; [`wake_fifo`] provides
/// one after `stop` has been set.
pub fn serve_fifo<P, D>(device: &Device<P, D>, path: &Path, stop: &AtomicBool) -> Result<()>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    tracing::info!(path = %path.display(), "serving sink");

    while !stop.load(Ordering::Acquire) {
        let mut sink = File::open(path)?;
        let keyed = serve_reader(device, &mut sink, stop)?;
        tracing::debug!(bytes = keyed, "sink closed by writer");
    }

    tracing::info!("sink server stopped");
    Ok(())
}

/// Unblock a server waiting on `path`.
///
/// Writes a single newline, which keys nothing.
pub fn wake_fifo(path: &Path) -> io::Result<()> {
    let mut pipe = OpenOptions::new().write(true).open(path)?;
    pipe.write_all(b"\n")
}
