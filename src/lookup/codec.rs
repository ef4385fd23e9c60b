//! Dotted-decimal IPv4 codec.
//!
//! Keys are the big-endian interpretation of the four octets, which is the ordering the
//! reference tables use for their `from`/`to` columns.

use std::net::Ipv4Addr;

/// Numeric form of an IPv4 address. Spans `0..=2^32-1` without truncation.
pub type AddressKey = u32;

/// Parses exactly four dot-separated decimal octets into an `AddressKey`.
///
/// Each group must be one to three ASCII digits with a value in `0..=255`. Leading zeros are
/// accepted (`"010"` is ten); signs, whitespace and empty groups are not.
pub fn parse_ipv4(input: &str) -> Option<AddressKey> {
    let mut octets = [0u8; 4];
    let mut groups = input.split('.');

    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group.parse::<u8>().ok()?;
    }

    if groups.next().is_some() {
        return None;
    }

    Some(u32::from_be_bytes(octets))
}

/// Renders a key back to dotted-decimal form.
pub fn format_ipv4(key: AddressKey) -> String {
    Ipv4Addr::from(key).to_string()
}
