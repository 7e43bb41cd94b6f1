//! Utility functions for hardware testing.
//!
//! Provides helpers for port discovery, fixture setup and timing.

use serial_core::{OpenMode, Port, PortConfig, PortRegistry, Transport};
use std::env;
use std::time::{Duration, Instant};

/// Test port configuration from environment.
pub struct TestPortConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub loopback_enabled: bool,
}

impl TestPortConfig {
    /// Get test configuration from environment variables.
    pub fn from_env() -> Option<Self> {
        let port_name = env::var("TEST_PORT").ok()?;
        let baud_rate = env::var("TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9600);
        let loopback_enabled = env::var("TEST_LOOPBACK").ok().as_deref() == Some("1");

        Some(TestPortConfig {
            port_name,
            baud_rate,
            loopback_enabled,
        })
    }

    /// Line settings applied right after opening.
    pub fn to_port_config(&self) -> PortConfig {
        PortConfig::new()
            .with_baud_rate(self.baud_rate)
            .unwrap_or_default()
    }
}

/// Every port the host reports, or none if enumeration fails.
pub fn discover_available_ports() -> Vec<Port> {
    PortRegistry::native().enumerate().unwrap_or_default()
}

pub fn discover_usb_ports() -> Vec<Port> {
    discover_available_ports()
        .into_iter()
        .filter(|port| port.transport() == Transport::Usb)
        .collect()
}

/// Print available ports for debugging.
pub fn print_available_ports() {
    let ports = discover_available_ports();

    if ports.is_empty() {
        println!("No serial ports detected on this system");
        return;
    }

    println!("Available serial ports ({}):", ports.len());
    for (idx, port) in ports.iter().enumerate() {
        println!("  {}. {} ({})", idx + 1, port.name(), port.description());
        println!("     Transport: {}", port.transport());

        if let Ok((vid, pid)) = port.usb_vid_pid() {
            println!("     VID:PID = {:04x}:{:04x}", vid, pid);
        }
        if let Some(manufacturer) = port.usb_manufacturer() {
            println!("     Manufacturer: {}", manufacturer);
        }
        if let Some(serial) = port.usb_serial() {
            println!("     Serial: {}", serial);
        }
    }
}

/// Timing helper for measuring operation duration.
pub struct TimingHelper {
    start: Instant,
    name: String,
}

impl TimingHelper {
    pub fn new(name: &str) -> Self {
        println!("Starting: {}", name);
        TimingHelper {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        println!("Completed: {} in {:?}", self.name, elapsed);
        elapsed
    }
}

/// An open port configured from the environment.
pub struct PortTestFixture {
    pub port: Port,
    config: TestPortConfig,
}

impl PortTestFixture {
    /// Open `TEST_PORT` read/write, or `None` when it is unset or unusable.
    pub fn setup() -> Option<Self> {
        let config = TestPortConfig::from_env()?;

        println!(
            "Setting up test fixture for {} at {} baud",
            config.port_name, config.baud_rate
        );

        let port = match PortRegistry::native().by_name(&config.port_name) {
            Ok(p) => p,
            Err(e) => {
                println!("Failed to find port: {}", e);
                return None;
            }
        };
        if let Err(e) = port.open(OpenMode::READ_WRITE) {
            println!("Failed to open port: {}", e);
            return None;
        }
        if let Err(e) = port.apply_config(&config.to_port_config()) {
            println!("Failed to configure port: {}", e);
            return None;
        }

        Some(PortTestFixture { port, config })
    }

    pub fn is_loopback(&self) -> bool {
        self.config.loopback_enabled
    }

    pub fn port_name(&self) -> &str {
        &self.config.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl Drop for PortTestFixture {
    fn drop(&mut self) {
        if self.port.is_open() {
            let _ = self.port.close();
        }
    }
}

/// Assert that duration is within expected range.
pub fn assert_duration_within(
    actual: Duration,
    expected: Duration,
    tolerance: Duration,
    message: &str,
) {
    let lower = expected.saturating_sub(tolerance);
    let upper = expected + tolerance;

    assert!(
        actual >= lower && actual <= upper,
        "{}: expected {:?} ± {:?}, got {:?}",
        message,
        expected,
        tolerance,
        actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_ports_does_not_panic() {
        let ports = discover_available_ports();
        println!("Found {} ports", ports.len());
        assert!(ports.iter().all(|p| !p.is_open()));
    }

    #[test]
    fn test_timing_helper() {
        let timer = TimingHelper::new("sleep");
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.finish() >= Duration::from_millis(10));
    }

    #[test]
    #[should_panic]
    fn test_assert_duration_out_of_range() {
        assert_duration_within(
            Duration::from_millis(200),
            Duration::from_millis(100),
            Duration::from_millis(10),
            "should panic",
        );
    }
}
