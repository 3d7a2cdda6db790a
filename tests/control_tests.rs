//! Control surface tests: interval attribute and sink permissions

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use rstest::rstest;

use rust_morse_led::config::{MorseConfig, ParamSetError, DEFAULT_PIN};
use rust_morse_led::control::{apply_sink_mode, IntervalAttribute, SINK_MODE};

#[rstest]
#[case("100", 100)]
#[case("250\n", 250)]
#[case("  1000 \n", 1000)]
#[case("4294967295", u32::MAX)]
fn test_store_accepts(#[case] text: &str, #[case] expected: u32) {
    let config = MorseConfig::new(DEFAULT_PIN);
    let attr = IntervalAttribute::new(&config);

    assert_eq!(attr.store(text), Ok(text.len()));
    assert_eq!(config.unit_ms(), expected);
    assert_eq!(attr.show(), format!("{}\n", expected));
}

#[rstest]
#[case("99", ParamSetError::BelowMinimum)]
#[case("0", ParamSetError::BelowMinimum)]
#[case("-5", ParamSetError::InvalidValue)]
#[case("3e2", ParamSetError::InvalidValue)]
#[case("4294967296", ParamSetError::InvalidValue)]
fn test_store_rejects(#[case] text: &str, #[case] error: ParamSetError) {
    let config = MorseConfig::new(DEFAULT_PIN);
    let attr = IntervalAttribute::new(&config);

    assert_eq!(attr.store(text), Err(error));
    assert_eq!(attr.show(), "300\n");
}

#[test]
fn test_store_seen_by_shared_handle() {
    let config = Arc::new(MorseConfig::new(DEFAULT_PIN));
    let reader = Arc::clone(&config);

    IntervalAttribute::new(&config).store("150").unwrap();
    assert_eq!(reader.unit_ms(), 150);
}

#[test]
fn test_apply_sink_mode_sets_write_only() {
    let path = std::env::temp_dir().join(format!("morse-led-sink-{}", std::process::id()));
    fs::write(&path, b"").unwrap();

    apply_sink_mode(&path).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, SINK_MODE);

    fs::remove_file(&path).unwrap();
}
