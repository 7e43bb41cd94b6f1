//! Behaviour of the flat handle API when handed absent or closed handles.
//!
//! Lookups of real device nodes run against the host; every other check runs
//! against a mock-backed port named like the first UART so it never depends on
//! what hardware the machine has.

mod common;

use serial_core::api;
use serial_core::{EventMask, OpenMode, Port, Signals};
use serial_test::serial;
use std::sync::Arc;

const SERIAL_PORT: &str = "/dev/ttyS0";

fn closed_port() -> Port {
    let (registry, _provider) = common::mock_registry(&[SERIAL_PORT]);
    registry.by_name(SERIAL_PORT).expect("mock UART is registered")
}

#[test]
fn test_get_port_by_name_existing_node() {
    if !common::device_node_exists(SERIAL_PORT) {
        println!("Skipping: {SERIAL_PORT} does not exist on this host");
        return;
    }
    let mut port = None;
    assert_eq!(api::get_port_by_name(Some(SERIAL_PORT), Some(&mut port)), 0);
    assert!(port.is_some());
    api::free_port(port.take());
}

#[test]
fn test_get_port_by_name_failures_leave_output_unset() {
    let mut port = None;
    assert!(api::get_port_by_name(Some("/dev/foobar"), Some(&mut port)) < 0);
    assert!(port.is_none());

    assert!(api::get_port_by_name(None, Some(&mut port)) < 0);
    assert!(port.is_none());

    assert!(api::get_port_by_name(Some(SERIAL_PORT), None) < 0);
    assert!(api::get_port_by_name(None, None) < 0);
}

#[test]
fn test_identity_null_checks() {
    let port = closed_port();

    assert!(api::get_port_name(Some(&port)).is_some());
    assert!(api::get_port_name(None).is_none());
    assert!(api::get_port_description(Some(&port)).is_some());
    assert!(api::get_port_description(None).is_none());

    assert_eq!(api::get_port_transport(Some(&port)), 0);
    assert!(api::get_port_transport(None) < 0);

    let mut handle = None;
    assert_eq!(api::get_port_handle(Some(&port), Some(&mut handle)), 0);
    assert!(handle.is_none());
    assert!(api::get_port_handle(None, Some(&mut handle)) < 0);
    assert!(api::get_port_handle(Some(&port), None) < 0);
    assert!(api::get_port_handle(None, None) < 0);

    api::free_port(None);
}

#[test]
fn test_list_and_copy() {
    let mut list = None;
    let ret = api::list_ports(Some(&mut list));
    if ret == 0 {
        assert!(list.is_some());
    } else {
        assert!(ret < 0);
        assert!(list.is_none());
    }
    api::free_port_list(list);
    assert!(api::list_ports(None) < 0);
    api::free_port_list(None);

    let port = closed_port();
    let mut copy = None;
    assert_eq!(api::copy_port(Some(&port), Some(&mut copy)), 0);
    assert!(copy.is_some());
    api::free_port(Some(port));

    assert!(api::copy_port(copy.as_ref(), None) < 0);
    let mut second = None;
    assert!(api::copy_port(None, Some(&mut second)) < 0);
    assert!(second.is_none());
    assert!(api::copy_port(None, None) < 0);
}

#[test]
fn test_io_null_checks() {
    let port = closed_port();
    let mut buf = [0u8; 10];

    assert!(api::open(None, OpenMode::READ.bits()) < 0);
    assert!(api::close(None) < 0);
    assert!(api::flush(None, 3) < 0);
    assert!(api::drain(None) < 0);

    assert!(api::blocking_write(None, Some(&buf), 0) < 0);
    assert!(api::blocking_write(Some(&port), None, 0) < 0);
    assert!(api::nonblocking_write(None, Some(&buf)) < 0);
    assert!(api::nonblocking_write(Some(&port), None) < 0);

    assert!(api::blocking_read(None, Some(&mut buf), 0) < 0);
    assert!(api::blocking_read(Some(&port), None, 0) < 0);
    assert!(api::nonblocking_read(None, Some(&mut buf)) < 0);
    assert!(api::nonblocking_read(Some(&port), None) < 0);

    assert!(api::input_waiting(None) < 0);
    assert!(api::output_waiting(None) < 0);
}

#[test]
fn test_event_set_null_checks() {
    let port = closed_port();

    assert!(api::new_event_set(None) < 0);
    let mut event_set = None;
    assert_eq!(api::new_event_set(Some(&mut event_set)), 0);
    api::free_event_set(event_set.take());

    assert_eq!(api::new_event_set(Some(&mut event_set)), 0);
    let error = EventMask::ERROR.bits();
    assert!(api::add_port_events(None, Some(&port), error) < 0);
    assert!(api::add_port_events(event_set.as_mut(), None, error) < 0);
    assert!(api::add_port_events(event_set.as_mut(), Some(&port), 999) < 0);
    assert_eq!(event_set.as_ref().map(|s| s.len()), Some(0));
    assert_eq!(api::add_port_events(event_set.as_mut(), Some(&port), error), 0);
    assert_eq!(api::wait(event_set.as_ref(), 100), 0);
    assert!(api::wait(None, 100) < 0);
    api::free_event_set(event_set);
}

#[test]
fn test_signals_and_break_on_closed_port() {
    let port = closed_port();
    let mut signals = Signals::empty();

    assert!(api::get_signals(Some(&port), Some(&mut signals)) < 0);
    assert!(api::get_signals(None, Some(&mut signals)) < 0);
    assert!(api::get_signals(Some(&port), None) < 0);
    assert!(api::get_signals(None, None) < 0);

    assert!(api::start_break(Some(&port)) < 0);
    assert!(api::start_break(None) < 0);
    assert!(api::end_break(Some(&port)) < 0);
    assert!(api::end_break(None) < 0);
}

#[test]
#[serial]
fn test_error_messages_and_debug_handlers() {
    assert!(api::blocking_read(None, None, 0) < 0);
    assert!(api::last_error_code() < 0);
    let message = api::last_error_message();
    assert!(!message.is_empty());
    api::free_error_message(Some(message));
    api::free_error_message(None);

    api::set_debug_handler(Some(Arc::new(|_: &str| {})));
    api::set_debug_handler(None);
    api::set_debug_handler(Some(Arc::new(|m: &str| api::default_debug_handler(Some(m)))));

    api::default_debug_handler(Some(&format!("{}", "foo")));
    api::default_debug_handler(Some(&format!("{}", 100)));
    api::default_debug_handler(None);
}

#[test]
fn test_config_null_checks() {
    let mut config = None;
    assert_eq!(api::new_config(Some(&mut config)), 0);

    let mut baudrate = 0;
    assert_eq!(api::get_config_baudrate(config.as_ref(), Some(&mut baudrate)), 0);
    assert_eq!(baudrate, api::UNSPECIFIED);
    assert!(api::get_config_baudrate(None, Some(&mut baudrate)) < 0);
    assert!(api::get_config_baudrate(config.as_ref(), None) < 0);

    let mut bits = 0;
    assert_eq!(api::get_config_bits(config.as_ref(), Some(&mut bits)), 0);
    assert_eq!(bits, api::UNSPECIFIED);
    assert!(api::get_config_bits(None, Some(&mut bits)) < 0);
    assert!(api::get_config_bits(config.as_ref(), None) < 0);

    assert_eq!(api::set_config_flowcontrol(config.as_mut(), 0), 0);
    api::free_config(config.take());
    assert!(api::set_config_flowcontrol(config.as_mut(), 0) < 0);

    assert!(api::set_flowcontrol(None, 0) < 0);
}

#[test]
fn test_version_numbers() {
    let numbers = [
        (api::get_major_package_version(), serial_core::version::PACKAGE_VERSION_MAJOR),
        (api::get_minor_package_version(), serial_core::version::PACKAGE_VERSION_MINOR),
        (api::get_micro_package_version(), serial_core::version::PACKAGE_VERSION_MICRO),
        (api::get_current_lib_version(), serial_core::version::LIB_VERSION_CURRENT),
        (api::get_revision_lib_version(), serial_core::version::LIB_VERSION_REVISION),
        (api::get_age_lib_version(), serial_core::version::LIB_VERSION_AGE),
    ];
    for (reported, constant) in numbers {
        assert_eq!(reported as u32, constant);
        assert!((0..=20).contains(&reported));
    }
}

#[test]
fn test_version_strings() {
    for s in [api::get_package_version_string(), api::get_lib_version_string()] {
        assert!((5..=20).contains(&s.len()), "unexpected version string {s:?}");
    }
}
