//! Tests requiring actual serial hardware.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=/dev/ttyUSB0          # or COM3 on Windows
//! export TEST_BAUD=9600                  # optional, default: 9600
//! export TEST_LOOPBACK=1                 # if port has TX-RX loopback
//!
//! cargo test --features hardware-tests -- --ignored
//! ```
//!
//! # Hardware Requirements
//!
//! - **Real port tests**: Any available serial port
//! - **Loopback tests**: Port with TX and RX connected together

use serial_core::api;
use serial_core::{Buffers, EventMask, EventSet, OpenMode, Parity, PortConfig, PortRegistry};
use std::time::Duration;

use crate::hardware::utils::{assert_duration_within, PortTestFixture, TimingHelper};

fn fixture() -> Option<PortTestFixture> {
    let fixture = PortTestFixture::setup();
    if fixture.is_none() {
        println!("Skipping hardware test: TEST_PORT not set or not usable");
    }
    fixture
}

fn loopback_fixture() -> Option<PortTestFixture> {
    let fixture = fixture()?;
    if !fixture.is_loopback() {
        println!("Skipping: TEST_LOOPBACK not set to 1");
        return None;
    }
    Some(fixture)
}

#[test]
#[ignore] // Run with --ignored flag
fn test_real_port_open_close() {
    let Some(fixture) = fixture() else { return };
    let port = &fixture.port;

    assert_eq!(port.name(), fixture.port_name());
    assert_eq!(port.mode(), Some(OpenMode::READ_WRITE));
    assert!(port.native_handle().is_some());

    port.close().unwrap();
    assert!(!port.is_open());
    assert!(port.close().is_err());
}

#[test]
#[ignore]
fn test_real_port_reports_configured_baud() {
    let Some(fixture) = fixture() else { return };

    let config = fixture.port.read_config().unwrap();
    assert_eq!(config.baud_rate(), Some(fixture.baud_rate()));
    assert!(config.data_bits().is_some());
    assert!(config.parity().is_some());
}

#[test]
#[ignore]
fn test_real_port_config_round_trip() {
    let Some(fixture) = fixture() else { return };
    let port = &fixture.port;

    let update = PortConfig::new()
        .with_baud_rate(19_200)
        .unwrap()
        .with_parity(Parity::Even);
    port.apply_config(&update).unwrap();

    let live = port.read_config().unwrap();
    assert_eq!(live.baud_rate(), Some(19_200));
    assert_eq!(live.parity(), Some(Parity::Even));
}

#[test]
#[ignore]
fn test_real_port_read_timeout() {
    let Some(fixture) = fixture() else { return };
    let port = &fixture.port;
    port.flush(Buffers::Input).unwrap();

    let timer = TimingHelper::new("blocking read with no data");
    let mut buf = [0u8; 64];
    let n = port.blocking_read(&mut buf, 200).unwrap();
    let elapsed = timer.finish();

    if n == 0 {
        assert_duration_within(
            elapsed,
            Duration::from_millis(200),
            Duration::from_millis(150),
            "read timeout",
        );
    }
}

#[test]
#[ignore]
fn test_real_port_signals_and_break() {
    let Some(fixture) = fixture() else { return };
    let port = &fixture.port;

    let signals = port.signals().unwrap();
    println!("Modem lines: {:?}", signals);

    port.start_break().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    port.end_break().unwrap();
}

#[test]
#[ignore]
fn test_loopback_write_read() {
    let Some(fixture) = loopback_fixture() else { return };
    let port = &fixture.port;
    port.flush(Buffers::Both).unwrap();

    let message = b"serial_core loopback";
    assert_eq!(port.blocking_write(message, 1000).unwrap(), message.len());
    port.drain().unwrap();

    let mut buf = vec![0u8; message.len()];
    assert_eq!(port.blocking_read(&mut buf, 1000).unwrap(), message.len());
    assert_eq!(&buf, message);
}

#[test]
#[ignore]
fn test_loopback_wakes_event_set() {
    let Some(fixture) = loopback_fixture() else { return };
    let port = &fixture.port;
    port.flush(Buffers::Both).unwrap();

    let mut events = EventSet::new();
    events
        .add_port_events(port, EventMask::READABLE.bits())
        .unwrap();
    assert!(!events.wait(0).unwrap());

    port.blocking_write(b"!", 1000).unwrap();
    assert!(events.wait(1000).unwrap());
    assert!(port.input_waiting().unwrap() >= 1);
}

#[test]
#[ignore]
fn test_flat_api_against_real_port() {
    let Some(name) = std::env::var("TEST_PORT").ok() else {
        println!("Skipping hardware test: TEST_PORT not set");
        return;
    };

    let mut port = None;
    assert_eq!(api::get_port_by_name(Some(name.as_str()), Some(&mut port)), 0);
    let port = port.unwrap();
    assert_eq!(api::open(Some(&port), OpenMode::READ_WRITE.bits()), 0);

    let mut handle = None;
    assert_eq!(api::get_port_handle(Some(&port), Some(&mut handle)), 0);
    assert!(handle.is_some());

    assert!(api::input_waiting(Some(&port)) >= 0);
    assert_eq!(api::close(Some(&port)), 0);

    let copy = PortRegistry::native().copy(&port);
    assert!(!copy.is_open());
}
