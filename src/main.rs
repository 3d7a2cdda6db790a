//! RustMorseLed - Main entry point
//!
//! 1. Load settings, map the GPIO block (or simulate it)
//! 2. Configure the LED pin as output, driven low
//! 3. Serve the sink on one thread, drain the transmit log on another
//! 4. Run the console on stdin until `quit` or EOF
//! 5. Stop the server, drive the LED low, unmap

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing_subscriber::EnvFilter;

use rust_morse_led::console::{Console, ConsoleContext, VERSION};
use rust_morse_led::hal::{GpioPin, RegisterBank, StdDelay};
use rust_morse_led::control::{self, IntervalAttribute};
use rust_morse_led::{logging, server};
use rust_morse_led::{Device, Result, Settings, Transmitter};

const USAGE: &str = "usage: morse-led [--config <file>] [--simulate] [--no-console]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    simulate: bool,
    no_console: bool,
}

fn parse_args() -> std::result::Result<Args, String> {
    let mut args = Args::default();
    let mut it = env::args().skip(1);

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let path = it.next().ok_or_else(|| "--config needs a path".to_string())?;
                args.config = Some(PathBuf::from(path));
            }
            "--simulate" => args.simulate = true,
            "--no-console" => args.no_console = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    tracing::info!("{}", VERSION);

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    tracing::debug!(?settings, "settings loaded");

    let bank = if args.simulate {
        tracing::warn!("simulated GPIO bank, no LED will light");
        RegisterBank::simulated()
    } else {
        RegisterBank::map(&settings.mem_device, settings.gpio_base)?
    };
    tracing::info!(mapped = bank.is_mapped(), "GPIO register bank ready");

    let config = Arc::new(settings.morse_config()?);
    let pin = GpioPin::output(&bank, settings.pin)?;
    tracing::info!(pin = pin.number(), unit_ms = config.unit_ms(), "LED output ready");

    let device = Device::new(Transmitter::new(pin, StdDelay, Arc::clone(&config)));

    let interval = match &settings.attribute_path {
        Some(path) => IntervalAttribute::published(&config, path)?,
        None => IntervalAttribute::new(&config),
    };

    if settings.apply_sink_mode {
        control::apply_sink_mode(&settings.sink_path)?;
    } else if !settings.sink_path.exists() {
        return Err(rust_morse_led::LedError::SinkMissing(settings.sink_path.clone()));
    }

    let stop = AtomicBool::new(false);
    let log_stop = AtomicBool::new(false);

    let served = thread::scope(|s| {
        let drain = s.spawn(|| logging::drain_task(logging::tx_log_ring(), &log_stop));
        let sink = s.spawn(|| server::serve_fifo(&device, &settings.sink_path, &stop));

        if args.no_console {
            // Daemon mode: the server runs until the process is killed.
            let served = sink.join();
            log_stop.store(true, Ordering::Release);
            let _ = drain.join();
            return served;
        }

        let console = Console::new(ConsoleContext {
            interval: &interval,
            stats: device.stats(),
        });
        if let Err(e) = console.run(io::stdin().lock(), io::stdout().lock()) {
            tracing::warn!("console: {}", e);
        }

        stop.store(true, Ordering::Release);
        if !sink.is_finished() {
            if let Err(e) = server::wake_fifo(&settings.sink_path) {
                tracing::warn!("cannot wake sink server: {}", e);
            }
        }
        let served = sink.join();

        log_stop.store(true, Ordering::Release);
        let _ = drain.join();
        served
    });

    // Transmitter drops here and drives the pin low; the bank unmaps after.
    drop(device);
    tracing::info!("LED off, shutting down");
    drop(bank);

    match served {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::Other, "sink server panicked").into()),
    }
}
