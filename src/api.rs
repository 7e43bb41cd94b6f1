//! Flat handle API.
//!
//! Each function mirrors one call of the classic C serial-port interface:
//! handles that may be absent are `Option`s, results are `i32` (a byte count or
//! `ErrorCode::Ok` on success, a negative [`ErrorCode`] on failure), and
//! out-parameters are `Option<&mut _>`. Every fallible call records its outcome
//! in the calling thread's error context, so [`last_error_message`] explains any
//! negative return.
//!
//! Port out-parameters are reset to `None` on entry. Scalar out-parameters are
//! written only on success. Config getters report an unspecified field as `-1`.
//!
//! ```
//! use serial_core::api;
//!
//! let mut port = None;
//! assert!(api::get_port_by_name(Some("/dev/foobar"), Some(&mut port)) < 0);
//! assert!(port.is_none());
//! assert!(api::last_error_code() < 0);
//! ```

use crate::diagnostics::{self, fail, record, DebugHandler};
use crate::error::{Error, ErrorCode, Result};
use crate::events::EventSet;
use crate::port::{
    Buffers, ConfigField, Cts, DataBits, Dsr, Dtr, FlowControl, NativeHandle, OpenMode, Parity,
    Port, PortConfig, Rts, Signals, StopBits, XonXoff,
};
use crate::registry::PortRegistry;
use crate::version;

/// Integer encoding of an enumerated setting.
pub trait ApiCode: Sized + Copy {
    fn to_code(self) -> i32;
    fn from_code(code: i32) -> Option<Self>;
}

macro_rules! api_codes {
    ($ty:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        impl ApiCode for $ty {
            fn to_code(self) -> i32 {
                match self {
                    $($ty::$variant => $code,)+
                }
            }

            fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($code => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

api_codes!(Parity { None = 0, Odd = 1, Even = 2, Mark = 3, Space = 4 });
api_codes!(Rts { Off = 0, On = 1, FlowControl = 2 });
api_codes!(Cts { Ignore = 0, FlowControl = 1 });
api_codes!(Dtr { Off = 0, On = 1, FlowControl = 2 });
api_codes!(Dsr { Ignore = 0, FlowControl = 1 });
api_codes!(XonXoff { Disabled = 0, In = 1, Out = 2, InOut = 3 });
api_codes!(FlowControl { None = 0, XonXoff = 1, RtsCts = 2, DtrDsr = 3 });
api_codes!(Buffers { Input = 1, Output = 2, Both = 3 });

/// Value a config getter reports for an unspecified field, and a setter
/// accepts to unset one.
pub const UNSPECIFIED: i32 = -1;

fn absent(operation: &str, what: &str) -> i32 {
    fail(operation, Error::invalid_arg(format!("{what} is absent"))).as_i32()
}

fn invalid(operation: &str, message: String) -> i32 {
    fail(operation, Error::invalid_arg(message)).as_i32()
}

fn ok(operation: &str) -> i32 {
    let _ = record(operation, Ok(()));
    ErrorCode::Ok.as_i32()
}

/// Collapse an already-recorded result into a return code.
fn code<T>(result: Result<T>) -> i32 {
    match result {
        Ok(_) => ErrorCode::Ok.as_i32(),
        Err(e) => e.code().as_i32(),
    }
}

fn count(result: Result<usize>) -> i32 {
    match result {
        Ok(n) => i32::try_from(n).unwrap_or(i32::MAX),
        Err(e) => e.code().as_i32(),
    }
}

fn saturate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// ---- enumeration and lookup -------------------------------------------------

/// List every port on the host.
pub fn list_ports(list: Option<&mut Option<Vec<Port>>>) -> i32 {
    let Some(list) = list else {
        return absent("list_ports", "port list output");
    };
    *list = None;
    match PortRegistry::native().enumerate() {
        Ok(ports) => {
            *list = Some(ports);
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

/// Look a port up by name.
pub fn get_port_by_name(name: Option<&str>, port: Option<&mut Option<Port>>) -> i32 {
    let Some(port) = port else {
        return absent("get_port_by_name", "port output");
    };
    *port = None;
    let Some(name) = name else {
        return absent("get_port_by_name", "port name");
    };
    match PortRegistry::native().by_name(name) {
        Ok(found) => {
            *port = Some(found);
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

/// Make a closed copy of `port`.
pub fn copy_port(port: Option<&Port>, copy: Option<&mut Option<Port>>) -> i32 {
    let Some(copy) = copy else {
        return absent("copy_port", "port output");
    };
    *copy = None;
    let Some(port) = port else {
        return absent("copy_port", "port");
    };
    *copy = Some(port.detached_copy());
    ok("copy_port")
}

/// Release a port, closing it first if it is open.
pub fn free_port(port: Option<Port>) {
    drop(port);
}

pub fn free_port_list(list: Option<Vec<Port>>) {
    drop(list);
}

// ---- identity ---------------------------------------------------------------

pub fn get_port_name(port: Option<&Port>) -> Option<&str> {
    port.map(Port::name)
}

pub fn get_port_description(port: Option<&Port>) -> Option<&str> {
    port.map(Port::description)
}

/// Transport code (`Transport::as_i32`) or a negative error.
pub fn get_port_transport(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => {
            let _ = record("get_port_transport", Ok(()));
            port.transport().as_i32()
        }
        None => absent("get_port_transport", "port"),
    }
}

pub fn get_port_usb_bus_address(
    port: Option<&Port>,
    bus: Option<&mut i32>,
    address: Option<&mut i32>,
) -> i32 {
    let Some(port) = port else {
        return absent("get_port_usb_bus_address", "port");
    };
    match port.usb_bus_address() {
        Ok((b, a)) => {
            if let Some(bus) = bus {
                *bus = saturate(b);
            }
            if let Some(address) = address {
                *address = saturate(a);
            }
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

pub fn get_port_usb_vid_pid(
    port: Option<&Port>,
    vid: Option<&mut i32>,
    pid: Option<&mut i32>,
) -> i32 {
    let Some(port) = port else {
        return absent("get_port_usb_vid_pid", "port");
    };
    match port.usb_vid_pid() {
        Ok((v, p)) => {
            if let Some(vid) = vid {
                *vid = i32::from(v);
            }
            if let Some(pid) = pid {
                *pid = i32::from(p);
            }
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

pub fn get_port_usb_manufacturer(port: Option<&Port>) -> Option<&str> {
    port?.usb_manufacturer()
}

pub fn get_port_usb_product(port: Option<&Port>) -> Option<&str> {
    port?.usb_product()
}

pub fn get_port_usb_serial(port: Option<&Port>) -> Option<&str> {
    port?.usb_serial()
}

/// Store the OS descriptor in `handle`; `None` while the port is closed.
pub fn get_port_handle(port: Option<&Port>, handle: Option<&mut Option<NativeHandle>>) -> i32 {
    let (Some(port), Some(handle)) = (port, handle) else {
        return absent("get_port_handle", "port or handle output");
    };
    *handle = port.native_handle();
    ok("get_port_handle")
}

// ---- lifecycle --------------------------------------------------------------

/// Open with `flags`, a combination of `OpenMode` bits.
pub fn open(port: Option<&Port>, flags: u32) -> i32 {
    let Some(port) = port else {
        return absent("open", "port");
    };
    match OpenMode::from_bits(flags) {
        Some(mode) => code(port.open(mode)),
        None => invalid("open", format!("invalid open flags {flags:#x}")),
    }
}

pub fn close(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => code(port.close()),
        None => absent("close", "port"),
    }
}

// ---- data transfer ----------------------------------------------------------

pub fn blocking_read(port: Option<&Port>, buf: Option<&mut [u8]>, timeout_ms: u32) -> i32 {
    match (port, buf) {
        (Some(port), Some(buf)) => count(port.blocking_read(buf, timeout_ms)),
        _ => absent("blocking_read", "port or buffer"),
    }
}

pub fn nonblocking_read(port: Option<&Port>, buf: Option<&mut [u8]>) -> i32 {
    match (port, buf) {
        (Some(port), Some(buf)) => count(port.nonblocking_read(buf)),
        _ => absent("nonblocking_read", "port or buffer"),
    }
}

pub fn blocking_write(port: Option<&Port>, buf: Option<&[u8]>, timeout_ms: u32) -> i32 {
    match (port, buf) {
        (Some(port), Some(buf)) => count(port.blocking_write(buf, timeout_ms)),
        _ => absent("blocking_write", "port or buffer"),
    }
}

pub fn nonblocking_write(port: Option<&Port>, buf: Option<&[u8]>) -> i32 {
    match (port, buf) {
        (Some(port), Some(buf)) => count(port.nonblocking_write(buf)),
        _ => absent("nonblocking_write", "port or buffer"),
    }
}

pub fn input_waiting(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => count(port.input_waiting()),
        None => absent("input_waiting", "port"),
    }
}

pub fn output_waiting(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => count(port.output_waiting()),
        None => absent("output_waiting", "port"),
    }
}

/// Discard buffered data. `buffers` is a [`Buffers`] code.
pub fn flush(port: Option<&Port>, buffers: i32) -> i32 {
    let Some(port) = port else {
        return absent("flush", "port");
    };
    match Buffers::from_code(buffers) {
        Some(buffers) => code(port.flush(buffers)),
        None => invalid("flush", format!("invalid buffer selection {buffers}")),
    }
}

pub fn drain(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => code(port.drain()),
        None => absent("drain", "port"),
    }
}

// ---- readiness --------------------------------------------------------------

pub fn new_event_set<'p>(event_set: Option<&mut Option<EventSet<'p>>>) -> i32 {
    let Some(event_set) = event_set else {
        return absent("new_event_set", "event set output");
    };
    *event_set = Some(EventSet::new());
    ok("new_event_set")
}

/// Watch `port` for `mask`, a combination of `EventMask` bits.
pub fn add_port_events<'p>(
    event_set: Option<&mut EventSet<'p>>,
    port: Option<&'p Port>,
    mask: u32,
) -> i32 {
    match (event_set, port) {
        (Some(event_set), Some(port)) => code(event_set.add_port_events(port, mask)),
        _ => absent("add_port_events", "event set or port"),
    }
}

/// Wait for any registered event. Zero polls once; negative waits forever.
pub fn wait(event_set: Option<&EventSet<'_>>, timeout_ms: i32) -> i32 {
    match event_set {
        Some(event_set) => code(event_set.wait(timeout_ms)),
        None => absent("wait", "event set"),
    }
}

pub fn free_event_set(event_set: Option<EventSet<'_>>) {
    drop(event_set);
}

// ---- signals and break ------------------------------------------------------

pub fn get_signals(port: Option<&Port>, signals: Option<&mut Signals>) -> i32 {
    let (Some(port), Some(signals)) = (port, signals) else {
        return absent("get_signals", "port or signal output");
    };
    match port.signals() {
        Ok(current) => {
            *signals = current;
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

pub fn start_break(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => code(port.start_break()),
        None => absent("start_break", "port"),
    }
}

pub fn end_break(port: Option<&Port>) -> i32 {
    match port {
        Some(port) => code(port.end_break()),
        None => absent("end_break", "port"),
    }
}

// ---- configuration values ---------------------------------------------------

pub fn new_config(config: Option<&mut Option<PortConfig>>) -> i32 {
    let Some(config) = config else {
        return absent("new_config", "config output");
    };
    *config = Some(PortConfig::new());
    ok("new_config")
}

pub fn free_config(config: Option<PortConfig>) {
    drop(config);
}

fn get_field<T>(
    operation: &str,
    config: Option<&PortConfig>,
    out: Option<&mut i32>,
    field: impl FnOnce(&PortConfig) -> Option<T>,
    encode: impl FnOnce(T) -> i32,
) -> i32 {
    let (Some(config), Some(out)) = (config, out) else {
        return absent(operation, "config or output");
    };
    *out = field(config).map_or(UNSPECIFIED, encode);
    ok(operation)
}

fn set_field<T>(
    operation: &str,
    config: Option<&mut PortConfig>,
    value: i32,
    field: ConfigField,
    decode: impl FnOnce(i32) -> Option<T>,
    store: impl FnOnce(&mut PortConfig, T) -> Result<()>,
) -> i32 {
    let Some(config) = config else {
        return absent(operation, "config");
    };
    if value == UNSPECIFIED {
        config.unset(field);
        return ok(operation);
    }
    match decode(value) {
        Some(decoded) => code(record(operation, store(config, decoded))),
        None => invalid(operation, format!("value {value} is out of range")),
    }
}

pub fn get_config_baudrate(config: Option<&PortConfig>, baudrate: Option<&mut i32>) -> i32 {
    get_field("get_config_baudrate", config, baudrate, PortConfig::baud_rate, saturate)
}

pub fn set_config_baudrate(config: Option<&mut PortConfig>, baudrate: i32) -> i32 {
    set_field(
        "set_config_baudrate",
        config,
        baudrate,
        ConfigField::BaudRate,
        |v| u32::try_from(v).ok(),
        |c, v| c.set_baud_rate(v),
    )
}

pub fn get_config_bits(config: Option<&PortConfig>, bits: Option<&mut i32>) -> i32 {
    get_field("get_config_bits", config, bits, PortConfig::data_bits, |b| {
        i32::from(b.bits())
    })
}

pub fn set_config_bits(config: Option<&mut PortConfig>, bits: i32) -> i32 {
    set_field(
        "set_config_bits",
        config,
        bits,
        ConfigField::DataBits,
        |v| u8::try_from(v).ok().and_then(|b| DataBits::try_from(b).ok()),
        |c, v| {
            c.set_data_bits(v);
            Ok(())
        },
    )
}

pub fn get_config_parity(config: Option<&PortConfig>, parity: Option<&mut i32>) -> i32 {
    get_field("get_config_parity", config, parity, PortConfig::parity, Parity::to_code)
}

pub fn set_config_parity(config: Option<&mut PortConfig>, parity: i32) -> i32 {
    set_field(
        "set_config_parity",
        config,
        parity,
        ConfigField::Parity,
        Parity::from_code,
        |c, v| {
            c.set_parity(v);
            Ok(())
        },
    )
}

pub fn get_config_stopbits(config: Option<&PortConfig>, stopbits: Option<&mut i32>) -> i32 {
    get_field("get_config_stopbits", config, stopbits, PortConfig::stop_bits, |s| {
        i32::from(s.bits())
    })
}

pub fn set_config_stopbits(config: Option<&mut PortConfig>, stopbits: i32) -> i32 {
    set_field(
        "set_config_stopbits",
        config,
        stopbits,
        ConfigField::StopBits,
        |v| u8::try_from(v).ok().and_then(|b| StopBits::try_from(b).ok()),
        |c, v| {
            c.set_stop_bits(v);
            Ok(())
        },
    )
}

pub fn get_config_rts(config: Option<&PortConfig>, rts: Option<&mut i32>) -> i32 {
    get_field("get_config_rts", config, rts, PortConfig::rts, Rts::to_code)
}

pub fn set_config_rts(config: Option<&mut PortConfig>, rts: i32) -> i32 {
    set_field("set_config_rts", config, rts, ConfigField::Rts, Rts::from_code, |c, v| {
        c.set_rts(v);
        Ok(())
    })
}

pub fn get_config_cts(config: Option<&PortConfig>, cts: Option<&mut i32>) -> i32 {
    get_field("get_config_cts", config, cts, PortConfig::cts, Cts::to_code)
}

pub fn set_config_cts(config: Option<&mut PortConfig>, cts: i32) -> i32 {
    set_field("set_config_cts", config, cts, ConfigField::Cts, Cts::from_code, |c, v| {
        c.set_cts(v);
        Ok(())
    })
}

pub fn get_config_dtr(config: Option<&PortConfig>, dtr: Option<&mut i32>) -> i32 {
    get_field("get_config_dtr", config, dtr, PortConfig::dtr, Dtr::to_code)
}

pub fn set_config_dtr(config: Option<&mut PortConfig>, dtr: i32) -> i32 {
    set_field("set_config_dtr", config, dtr, ConfigField::Dtr, Dtr::from_code, |c, v| {
        c.set_dtr(v);
        Ok(())
    })
}

pub fn get_config_dsr(config: Option<&PortConfig>, dsr: Option<&mut i32>) -> i32 {
    get_field("get_config_dsr", config, dsr, PortConfig::dsr, Dsr::to_code)
}

pub fn set_config_dsr(config: Option<&mut PortConfig>, dsr: i32) -> i32 {
    set_field("set_config_dsr", config, dsr, ConfigField::Dsr, Dsr::from_code, |c, v| {
        c.set_dsr(v);
        Ok(())
    })
}

pub fn get_config_xon_xoff(config: Option<&PortConfig>, xon_xoff: Option<&mut i32>) -> i32 {
    get_field(
        "get_config_xon_xoff",
        config,
        xon_xoff,
        PortConfig::xon_xoff,
        XonXoff::to_code,
    )
}

pub fn set_config_xon_xoff(config: Option<&mut PortConfig>, xon_xoff: i32) -> i32 {
    set_field(
        "set_config_xon_xoff",
        config,
        xon_xoff,
        ConfigField::XonXoff,
        XonXoff::from_code,
        |c, v| {
            c.set_xon_xoff(v);
            Ok(())
        },
    )
}

/// Set the five flow-control fields from a [`FlowControl`] code.
pub fn set_config_flowcontrol(config: Option<&mut PortConfig>, flowcontrol: i32) -> i32 {
    const OP: &str = "set_config_flowcontrol";
    let Some(config) = config else {
        return absent(OP, "config");
    };
    match FlowControl::from_code(flowcontrol) {
        Some(preset) => {
            config.set_flow_control(preset);
            ok(OP)
        }
        None => invalid(OP, format!("invalid flow control {flowcontrol}")),
    }
}

// ---- configuration of open ports --------------------------------------------

/// Overwrite `config` with the live settings of `port`.
pub fn get_config(port: Option<&Port>, config: Option<&mut PortConfig>) -> i32 {
    let (Some(port), Some(config)) = (port, config) else {
        return absent("get_config", "port or config");
    };
    match port.read_config() {
        Ok(live) => {
            *config = live;
            ErrorCode::Ok.as_i32()
        }
        Err(e) => e.code().as_i32(),
    }
}

/// Apply every specified field of `config` to `port`.
pub fn set_config(port: Option<&Port>, config: Option<&PortConfig>) -> i32 {
    match (port, config) {
        (Some(port), Some(config)) => code(port.apply_config(config)),
        _ => absent("set_config", "port or config"),
    }
}

/// Apply one field through a scratch config, the way the per-field port
/// setters do.
fn set_port_field(
    operation: &str,
    port: Option<&Port>,
    build: impl FnOnce(&mut Option<PortConfig>) -> i32,
) -> i32 {
    let Some(port) = port else {
        return absent(operation, "port");
    };
    let mut scratch = Some(PortConfig::new());
    let ret = build(&mut scratch);
    if ret < 0 {
        return ret;
    }
    let config = scratch.unwrap_or_default();
    code(record(operation, port.apply_config(&config)))
}

pub fn set_baudrate(port: Option<&Port>, baudrate: i32) -> i32 {
    set_port_field("set_baudrate", port, |c| set_config_baudrate(c.as_mut(), baudrate))
}

pub fn set_bits(port: Option<&Port>, bits: i32) -> i32 {
    set_port_field("set_bits", port, |c| set_config_bits(c.as_mut(), bits))
}

pub fn set_parity(port: Option<&Port>, parity: i32) -> i32 {
    set_port_field("set_parity", port, |c| set_config_parity(c.as_mut(), parity))
}

pub fn set_stopbits(port: Option<&Port>, stopbits: i32) -> i32 {
    set_port_field("set_stopbits", port, |c| set_config_stopbits(c.as_mut(), stopbits))
}

pub fn set_rts(port: Option<&Port>, rts: i32) -> i32 {
    set_port_field("set_rts", port, |c| set_config_rts(c.as_mut(), rts))
}

pub fn set_cts(port: Option<&Port>, cts: i32) -> i32 {
    set_port_field("set_cts", port, |c| set_config_cts(c.as_mut(), cts))
}

pub fn set_dtr(port: Option<&Port>, dtr: i32) -> i32 {
    set_port_field("set_dtr", port, |c| set_config_dtr(c.as_mut(), dtr))
}

pub fn set_dsr(port: Option<&Port>, dsr: i32) -> i32 {
    set_port_field("set_dsr", port, |c| set_config_dsr(c.as_mut(), dsr))
}

pub fn set_xon_xoff(port: Option<&Port>, xon_xoff: i32) -> i32 {
    set_port_field("set_xon_xoff", port, |c| set_config_xon_xoff(c.as_mut(), xon_xoff))
}

/// Apply a [`FlowControl`] preset on top of the live settings of `port`.
pub fn set_flowcontrol(port: Option<&Port>, flowcontrol: i32) -> i32 {
    const OP: &str = "set_flowcontrol";
    let Some(port) = port else {
        return absent(OP, "port");
    };
    match FlowControl::from_code(flowcontrol) {
        Some(preset) => code(port.set_flow_control(preset)),
        None => invalid(OP, format!("invalid flow control {flowcontrol}")),
    }
}

// ---- errors and debugging ---------------------------------------------------

pub fn last_error_code() -> i32 {
    diagnostics::last_error_code().as_i32()
}

/// Owned copy of the last failure message of this thread.
pub fn last_error_message() -> String {
    diagnostics::last_error_message()
}

pub fn free_error_message(message: Option<String>) {
    drop(message);
}

/// Install a debug handler, or silence debug output with `None`.
pub fn set_debug_handler(handler: Option<DebugHandler>) {
    diagnostics::set_debug_handler(handler);
}

pub fn default_debug_handler(message: Option<&str>) {
    diagnostics::default_debug_handler(message);
}

// ---- version ----------------------------------------------------------------

pub fn get_major_package_version() -> i32 {
    saturate(version::major_package_version())
}

pub fn get_minor_package_version() -> i32 {
    saturate(version::minor_package_version())
}

pub fn get_micro_package_version() -> i32 {
    saturate(version::micro_package_version())
}

pub fn get_package_version_string() -> &'static str {
    version::package_version_string()
}

pub fn get_current_lib_version() -> i32 {
    saturate(version::current_lib_version())
}

pub fn get_revision_lib_version() -> i32 {
    saturate(version::revision_lib_version())
}

pub fn get_age_lib_version() -> i32 {
    saturate(version::age_lib_version())
}

pub fn get_lib_version_string() -> &'static str {
    version::lib_version_string()
}
