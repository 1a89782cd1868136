//! Domain primitives: event context, entity key rendering, null-value checks.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Block metadata attached to every delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventContext {
    /// Address of the contract that emitted the event (the pool).
    pub address: Address,
    pub block_number: u64,
    /// Block timestamp in seconds since Unix epoch.
    pub block_timestamp: u64,
    /// Position of the log inside its block.
    #[serde(default)]
    pub log_index: u32,
}

impl EventContext {
    pub fn new(address: Address, block_number: u64, block_timestamp: u64, log_index: u32) -> Self {
        Self {
            address,
            block_number,
            block_timestamp,
            log_index,
        }
    }
}

/// Render an address the way entity ids embed it: lowercase, `0x`-prefixed.
pub fn address_key(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Parse an address previously rendered with [`address_key`].
pub fn parse_address(value: &str) -> Option<Address> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(digits).ok()?;
    if bytes.len() != 20 {
        return None;
    }
    Some(Address::from_slice(&bytes))
}

/// Some legacy tokens answer `symbol()`/`name()` with this bytes32 instead of
/// a string; such values must be treated as missing metadata.
const NULL_ETH_VALUE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

pub fn is_null_eth_value(value: &str) -> bool {
    value == NULL_ETH_VALUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_key_is_lowercase_hex() {
        let address = Address::repeat_byte(0xAB);
        assert_eq!(
            address_key(&address),
            "0xabababababababababababababababababababab"
        );
    }

    #[test]
    fn test_parse_address_roundtrip() {
        let address = Address::repeat_byte(0x42);
        assert_eq!(parse_address(&address_key(&address)), Some(address));
        assert_eq!(parse_address("0x1234"), None);
        assert_eq!(parse_address("not hex"), None);
    }

    #[test]
    fn test_is_null_eth_value() {
        assert!(is_null_eth_value(
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        ));
        assert!(!is_null_eth_value(
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
        ));
        assert!(!is_null_eth_value(
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        ));
    }
}
