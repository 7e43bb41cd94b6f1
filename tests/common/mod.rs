//! Shared test utilities.
//!
//! - Mock-backed registries with pre-registered devices
//! - Port builders that come back already open
//! - Skipping helpers for tests that need a real device node

#![allow(dead_code)]

use serial_core::{
    MockProvider, MockSerialPort, OpenMode, Port, PortInfo, PortRegistry, UsbIdentity,
};
use std::sync::Arc;

/// Registry over a fresh mock provider holding `names` as native ports.
pub fn mock_registry(names: &[&str]) -> (PortRegistry, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new());
    for name in names {
        provider.add_native(name);
    }
    (PortRegistry::with_provider(provider.clone()), provider)
}

/// Open `name` on a single-device mock registry and return the device handle.
pub fn open_mock_port(name: &str, mode: OpenMode) -> (Port, MockSerialPort) {
    let (registry, provider) = mock_registry(&[name]);
    let port = registry.by_name(name).expect("mock port is registered");
    port.open(mode).expect("mock port opens");
    let device = provider.device(name).expect("mock device exists");
    (port, device)
}

/// A mock USB adapter with full identity.
pub fn usb_identity() -> UsbIdentity {
    UsbIdentity {
        vid: 0x0403,
        pid: 0x6001,
        manufacturer: Some("FTDI".to_string()),
        product: Some("FT232R USB UART".to_string()),
        serial_number: Some("A50285BI".to_string()),
        bus: Some(1),
        address: Some(4),
    }
}

pub fn mock_usb_registry(name: &str) -> (PortRegistry, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new());
    provider.add(PortInfo::usb(name, usb_identity()));
    (PortRegistry::with_provider(provider.clone()), provider)
}

/// True when `path` names an existing device node on this host.
pub fn device_node_exists(path: &str) -> bool {
    std::path::Path::new(path).exists()
}
