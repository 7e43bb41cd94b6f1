//! Port identity as reported by enumeration.

use serde::Serialize;

/// How a port is attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Transport {
    /// A UART on the mainboard or an expansion card.
    Native = 0,
    Usb = 1,
    Bluetooth = 2,
    Unknown = 3,
}

impl Transport {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Transport::Native => "native",
            Transport::Usb => "usb",
            Transport::Bluetooth => "bluetooth",
            Transport::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Identity of a USB serial adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Bus number, when the platform reports topology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<u32>,
    /// Device address on `bus`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<u32>,
}

/// Everything known about a port without opening it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub description: String,
    pub transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb: Option<UsbIdentity>,
}

impl PortInfo {
    /// A UART with no further identity.
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Native serial port".to_string(),
            transport: Transport::Native,
            usb: None,
        }
    }

    pub fn usb(name: impl Into<String>, usb: UsbIdentity) -> Self {
        let description = usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| "USB device".to_string());
        Self {
            name: name.into(),
            description,
            transport: Transport::Usb,
            usb: Some(usb),
        }
    }

    pub fn bluetooth(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Bluetooth device".to_string(),
            transport: Transport::Bluetooth,
            usb: None,
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Unknown serial port".to_string(),
            transport: Transport::Unknown,
            usb: None,
        }
    }
}

impl From<serialport::SerialPortInfo> for PortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => PortInfo::usb(
                info.port_name,
                UsbIdentity {
                    vid: usb.vid,
                    pid: usb.pid,
                    manufacturer: usb.manufacturer,
                    product: usb.product,
                    serial_number: usb.serial_number,
                    bus: None,
                    address: None,
                },
            ),
            serialport::SerialPortType::BluetoothPort => PortInfo::bluetooth(info.port_name),
            serialport::SerialPortType::PciPort => PortInfo::native(info.port_name),
            serialport::SerialPortType::Unknown => PortInfo::unknown(info.port_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_description_fallbacks() {
        let full = UsbIdentity {
            vid: 0x0403,
            pid: 0x6001,
            manufacturer: Some("FTDI".into()),
            product: Some("FT232R USB UART".into()),
            ..UsbIdentity::default()
        };
        assert_eq!(PortInfo::usb("/dev/ttyUSB0", full).description, "FT232R USB UART");

        let maker_only = UsbIdentity {
            manufacturer: Some("FTDI".into()),
            ..UsbIdentity::default()
        };
        assert_eq!(PortInfo::usb("/dev/ttyUSB0", maker_only).description, "FTDI");

        let bare = PortInfo::usb("/dev/ttyUSB0", UsbIdentity::default());
        assert_eq!(bare.description, "USB device");
    }

    #[test]
    fn test_from_serialport_info() {
        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyS0".into(),
            port_type: serialport::SerialPortType::PciPort,
        };
        let converted = PortInfo::from(info);
        assert_eq!(converted.transport, Transport::Native);
        assert!(converted.usb.is_none());

        let info = serialport::SerialPortInfo {
            port_name: "/dev/rfcomm0".into(),
            port_type: serialport::SerialPortType::BluetoothPort,
        };
        assert_eq!(PortInfo::from(info).transport, Transport::Bluetooth);
    }

    #[test]
    fn test_transport_codes() {
        assert_eq!(Transport::Native.as_i32(), 0);
        assert_eq!(Transport::Usb.as_i32(), 1);
        assert_eq!(Transport::Bluetooth.as_i32(), 2);
        assert_eq!(Transport::Unknown.as_i32(), 3);
    }
}
