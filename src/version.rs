//! Package and library version numbers.
//!
//! The package version follows the crate version. The library version is the
//! `current:revision:age` interface triple and changes only when the public
//! surface does.

pub const PACKAGE_VERSION_MAJOR: u32 = parse_u32(env!("CARGO_PKG_VERSION_MAJOR"));
pub const PACKAGE_VERSION_MINOR: u32 = parse_u32(env!("CARGO_PKG_VERSION_MINOR"));
pub const PACKAGE_VERSION_MICRO: u32 = parse_u32(env!("CARGO_PKG_VERSION_PATCH"));
pub const PACKAGE_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

pub const LIB_VERSION_CURRENT: u32 = 1;
pub const LIB_VERSION_REVISION: u32 = 0;
pub const LIB_VERSION_AGE: u32 = 1;
pub const LIB_VERSION_STRING: &str = "1:0:1";

const fn parse_u32(digits: &str) -> u32 {
    let bytes = digits.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "version component is not numeric");
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

pub fn major_package_version() -> u32 {
    PACKAGE_VERSION_MAJOR
}

pub fn minor_package_version() -> u32 {
    PACKAGE_VERSION_MINOR
}

pub fn micro_package_version() -> u32 {
    PACKAGE_VERSION_MICRO
}

/// `"major.minor.micro"`.
pub fn package_version_string() -> &'static str {
    PACKAGE_VERSION_STRING
}

pub fn current_lib_version() -> u32 {
    LIB_VERSION_CURRENT
}

pub fn revision_lib_version() -> u32 {
    LIB_VERSION_REVISION
}

pub fn age_lib_version() -> u32 {
    LIB_VERSION_AGE
}

/// `"current:revision:age"`.
pub fn lib_version_string() -> &'static str {
    LIB_VERSION_STRING
}
