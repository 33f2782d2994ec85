//! Validation of user-supplied addresses.

use anyhow::Result;
use std::collections::HashSet;
use std::net::Ipv4Addr;

use crate::error::DropchainError;

/// Validate an IPv4 address string and return the parsed address.
///
/// # Examples
/// ```
/// use dropchain::validation::validate_ipv4;
/// assert!(validate_ipv4("192.168.1.1").is_ok());
/// assert!(validate_ipv4("::1").is_err());
/// assert!(validate_ipv4("10.0.0.0/8").is_err());
/// ```
pub fn validate_ipv4(addr: &str) -> Result<Ipv4Addr> {
    addr.trim()
        .parse()
        .map_err(|_| anyhow::Error::from(DropchainError::InvalidAddress(addr.trim().to_string())))
}

/// Split a comma-separated batch into validated addresses.
///
/// Whitespace around elements is ignored. Duplicates are dropped, keeping
/// the first occurrence, so a batch never asks for the same rule twice.
///
/// # Examples
/// ```
/// use dropchain::validation::parse_address_batch;
/// let batch = parse_address_batch("10.0.0.1, 10.0.0.2,10.0.0.1").unwrap();
/// assert_eq!(batch.len(), 2);
/// assert!(parse_address_batch("10.0.0.1,,10.0.0.2").is_err());
/// ```
pub fn parse_address_batch(batch: &str) -> Result<Vec<Ipv4Addr>> {
    let mut addresses: Vec<Ipv4Addr> = Vec::new();
    let mut seen = HashSet::new();

    for element in batch.split(',') {
        let addr = validate_ipv4(element)?;
        if seen.insert(addr) {
            addresses.push(addr);
        }
    }

    Ok(addresses)
}
