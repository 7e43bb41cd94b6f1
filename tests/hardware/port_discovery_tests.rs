//! Port discovery and enumeration tests.
//!
//! These tests don't require specific hardware but use whatever ports the
//! system has. They are ignored because they need at least some serial
//! hardware to be meaningful.

use serial_core::api;
use serial_core::{PortRegistry, Transport};
use std::collections::HashSet;

use crate::hardware::utils::{discover_available_ports, discover_usb_ports, print_available_ports};

#[test]
#[ignore] // Requires hardware
fn test_port_discovery() {
    let ports = discover_available_ports();

    if ports.is_empty() {
        println!("No ports found - skipping test");
        print_available_ports();
        return;
    }

    println!("Found {} port(s)", ports.len());
    for port in &ports {
        println!("  - {} ({})", port.name(), port.transport());
        assert!(!port.name().is_empty());
        assert!(!port.description().is_empty());
        assert!(!port.is_open());
    }
}

#[test]
#[ignore] // Requires USB hardware
fn test_usb_port_identity() {
    let usb_ports = discover_usb_ports();

    if usb_ports.is_empty() {
        println!("No USB ports found");
        return;
    }

    for port in &usb_ports {
        let (vid, pid) = port.usb_vid_pid().unwrap();
        println!("  - {} (VID:PID = {:04x}:{:04x})", port.name(), vid, pid);
        assert_eq!(port.transport(), Transport::Usb);
    }
}

#[test]
#[ignore] // Requires hardware
fn test_port_name_uniqueness() {
    let ports = discover_available_ports();
    if ports.is_empty() {
        println!("No ports found - skipping test");
        return;
    }

    let names: HashSet<&str> = ports.iter().map(|p| p.name()).collect();
    assert_eq!(names.len(), ports.len(), "port names must be unique");
}

#[test]
#[ignore] // Requires hardware
fn test_every_listed_port_is_found_by_name() {
    let registry = PortRegistry::native();
    for port in discover_available_ports() {
        let found = registry.by_name(port.name()).unwrap();
        assert_eq!(found.info(), port.info());
    }
}

#[test]
#[ignore] // Requires hardware
fn test_flat_listing_matches_registry() {
    let mut list = None;
    assert_eq!(api::list_ports(Some(&mut list)), 0);
    let listed = list.unwrap_or_default();

    let names: HashSet<String> = listed.iter().map(|p| p.name().to_string()).collect();
    let expected: HashSet<String> = discover_available_ports()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, expected);
    api::free_port_list(Some(listed));
}
