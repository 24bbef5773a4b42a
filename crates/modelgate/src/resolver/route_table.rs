//! Default-gateway extraction from the kernel routing table.
//!
//! `/proc/net/route` is a whitespace-separated table with one header row.
//! Addresses are hex-encoded in little-endian byte order, so the gateway
//! must be byte-swapped before it can be formatted as a dotted quad.

use std::net::Ipv4Addr;
use std::path::Path;
use tracing::warn;

/// RTF_UP: route is usable.
const RTF_UP: u32 = 0x0001;
/// RTF_GATEWAY: destination is reached via a gateway.
const RTF_GATEWAY: u32 = 0x0002;

/// All-zero destination marks the default route.
const DEFAULT_DESTINATION: &str = "00000000";

/// Read the routing table at `path` and return the default gateway, if any.
///
/// Returns `None` on any read or parse failure; resolution falls through to
/// the next tier.
pub fn default_gateway(path: &Path) -> Option<Ipv4Addr> {
    match std::fs::read_to_string(path) {
        Ok(table) => parse_default_gateway(&table),
        Err(e) => {
            warn!("Could not read routing table {}: {}", path.display(), e);
            None
        }
    }
}

/// Scan routing-table text for the first default-route record with both the
/// up and gateway flags set, and return its byte-order-corrected gateway.
pub fn parse_default_gateway(table: &str) -> Option<Ipv4Addr> {
    // First line is the column header.
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let destination = fields[1];
        let gateway_hex = fields[2];
        let Ok(flags) = u32::from_str_radix(fields[3], 16) else {
            continue;
        };

        if destination == DEFAULT_DESTINATION && flags & (RTF_UP | RTF_GATEWAY) == (RTF_UP | RTF_GATEWAY)
        {
            let Ok(raw) = u32::from_str_radix(gateway_hex, 16) else {
                continue;
            };
            // Stored little-endian: the low byte is the first octet.
            return Some(Ipv4Addr::from(raw.to_le_bytes()));
        }
    }
    None
}
