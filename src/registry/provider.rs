//! Sources of port identities and device adapters.

use super::info::PortInfo;
use crate::error::Result;
use crate::port::{MockSerialPort, NativeSerialPort, PortAdapter, PortError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Lists ports and opens adapters for them.
pub trait DeviceProvider: Send + Sync + std::fmt::Debug {
    /// Snapshot of every port currently present.
    fn list(&self) -> Result<Vec<PortInfo>>;

    /// Identity for a device node that `list` did not report, if one exists.
    fn probe_unlisted(&self, _name: &str) -> Option<PortInfo> {
        None
    }

    /// Open the device called `name`.
    fn open(&self, name: &str) -> std::result::Result<PortAdapter, PortError>;
}

/// The host's serial devices, through the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

impl DeviceProvider for NativeProvider {
    fn list(&self) -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports()?;
        tracing::debug!(count = ports.len(), "Enumerated serial ports");
        Ok(ports.into_iter().map(PortInfo::from).collect())
    }

    #[cfg(unix)]
    fn probe_unlisted(&self, name: &str) -> Option<PortInfo> {
        use std::os::unix::fs::FileTypeExt;

        let metadata = std::fs::metadata(name).ok()?;
        metadata
            .file_type()
            .is_char_device()
            .then(|| PortInfo::native(name))
    }

    fn open(&self, name: &str) -> std::result::Result<PortAdapter, PortError> {
        Ok(Box::new(NativeSerialPort::open(name)?))
    }
}

#[derive(Debug, Default)]
struct MockInventory {
    devices: Vec<(PortInfo, MockSerialPort)>,
    open_failures: HashMap<String, std::io::ErrorKind>,
}

/// An in-memory set of mock devices.
///
/// Tests keep the `MockSerialPort` returned by [`MockProvider::add`] to feed
/// input and inspect output of whatever `Port` opens it.
#[derive(Debug, Default)]
pub struct MockProvider {
    inventory: Mutex<MockInventory>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and return a handle sharing its state.
    pub fn add(&self, info: PortInfo) -> MockSerialPort {
        let device = MockSerialPort::new(info.name.clone());
        let mut inventory = self.inventory.lock();
        inventory.devices.retain(|(existing, _)| existing.name != info.name);
        inventory.devices.push((info, device.clone()));
        device
    }

    /// Register a native-transport device called `name`.
    pub fn add_native(&self, name: &str) -> MockSerialPort {
        self.add(PortInfo::native(name))
    }

    /// Unplug a device. Ports already open on it keep working.
    pub fn remove(&self, name: &str) -> bool {
        let mut inventory = self.inventory.lock();
        let before = inventory.devices.len();
        inventory.devices.retain(|(info, _)| info.name != name);
        inventory.devices.len() != before
    }

    pub fn device(&self, name: &str) -> Option<MockSerialPort> {
        self.inventory
            .lock()
            .devices
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(_, device)| device.clone())
    }

    /// Make every open of `name` fail with `kind`, or succeed again with `None`.
    pub fn set_open_failure(&self, name: &str, kind: Option<std::io::ErrorKind>) {
        let mut inventory = self.inventory.lock();
        match kind {
            Some(kind) => {
                inventory.open_failures.insert(name.to_string(), kind);
            }
            None => {
                inventory.open_failures.remove(name);
            }
        }
    }
}

impl DeviceProvider for MockProvider {
    fn list(&self) -> Result<Vec<PortInfo>> {
        Ok(self
            .inventory
            .lock()
            .devices
            .iter()
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn open(&self, name: &str) -> std::result::Result<PortAdapter, PortError> {
        let inventory = self.inventory.lock();
        if let Some(kind) = inventory.open_failures.get(name) {
            return Err(PortError::Io(std::io::Error::new(
                *kind,
                format!("cannot open {name}"),
            )));
        }
        let (_, device) = inventory
            .devices
            .iter()
            .find(|(info, _)| info.name == name)
            .ok_or_else(|| PortError::not_found(name))?;
        device.mark_opened();
        Ok(Box::new(device.clone()))
    }
}
