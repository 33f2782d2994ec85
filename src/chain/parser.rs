//! Parsing of `iptables -L <chain> -n` output.
//!
//! A numeric listing looks like:
//!
//! ```text
//! Chain DROPCHAIN (0 references)
//! target     prot opt source               destination
//! DROP       all  --  203.0.113.5          0.0.0.0/0
//! DROP       all  --  198.51.100.7         0.0.0.0/0
//! ```
//!
//! Rule lines carry placeholder columns (`--` for opt, `*` for interfaces in
//! verbose listings) right before the source address, which is what the
//! address extraction keys on.

use std::net::Ipv4Addr;

/// Case-insensitive markers of a missing chain across iptables versions.
const MISSING_CHAIN_MARKERS: &[&str] = &["no chain/target/match", "no such chain", "does not exist"];

/// Prefix of the first line of a chain listing.
const TABLE_HEADER_PREFIX: &str = "Chain ";

/// Structured view of a chain listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSnapshot {
    /// The listing began with the rule-table header
    pub header_recognized: bool,
    /// Dropped source addresses, top of chain first
    pub addresses: Vec<Ipv4Addr>,
    /// Raw listing text the snapshot was parsed from
    pub listing: String,
}

/// Parse a chain listing into a snapshot.
pub fn parse_listing(text: &str) -> ChainSnapshot {
    ChainSnapshot {
        header_recognized: has_table_header(text),
        addresses: extract_addresses(text),
        listing: text.to_string(),
    }
}

/// The tool refused to run for lack of privilege.
pub fn is_permission_denied(text: &str) -> bool {
    text.to_lowercase().contains("denied")
}

/// The tool reported that the chain does not exist.
pub fn is_missing_chain(text: &str) -> bool {
    let lower = text.to_lowercase();
    MISSING_CHAIN_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Whether the first non-empty line is a `Chain <name> (...)` header.
pub fn has_table_header(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start().starts_with(TABLE_HEADER_PREFIX))
        .unwrap_or(false)
}

/// Extract every IPv4 literal that directly follows a run of placeholder
/// tokens holding at least two placeholder characters, in listing order.
pub fn extract_addresses(text: &str) -> Vec<Ipv4Addr> {
    let mut addresses = Vec::new();

    for line in text.lines() {
        let mut placeholder_chars = 0;

        for token in line.split_whitespace() {
            if is_placeholder(token) {
                placeholder_chars += token.len();
                continue;
            }

            if placeholder_chars >= 2 {
                if let Ok(addr) = token.parse::<Ipv4Addr>() {
                    addresses.push(addr);
                }
            }
            placeholder_chars = 0;
        }
    }

    addresses
}

fn is_placeholder(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '-' || c == '*')
}
