//! Hard-coded metadata for legacy tokens whose contracts cannot answer
//! `symbol()`, `name()` or `decimals()` in the standard way.

use alloy_primitives::{address, Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticTokenDefinition {
    pub address: Address,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

const STATIC_DEFINITIONS: [StaticTokenDefinition; 6] = [
    StaticTokenDefinition {
        address: address!("e0b7927c4af23765cb51314a0e0521a9645f0e2a"),
        symbol: "DGD",
        name: "DGD",
        decimals: 9,
    },
    StaticTokenDefinition {
        address: address!("7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9"),
        symbol: "AAVE",
        name: "Aave Token",
        decimals: 18,
    },
    StaticTokenDefinition {
        address: address!("eb9951021698b42e4399f9cbb6267aa35f82d59d"),
        symbol: "LIF",
        name: "Lif",
        decimals: 18,
    },
    StaticTokenDefinition {
        address: address!("bdeb4b83251fb146687fa19d1c660f99411eefe3"),
        symbol: "SVD",
        name: "savedroid",
        decimals: 18,
    },
    StaticTokenDefinition {
        address: address!("bb9bc244d798123fde783fcc1c72d3bb8c189413"),
        symbol: "TheDAO",
        name: "TheDAO",
        decimals: 16,
    },
    StaticTokenDefinition {
        address: address!("38c6a68304cdefb9bec48bbfaaba5c5b47818bb2"),
        symbol: "HPB",
        name: "HPBCoin",
        decimals: 18,
    },
];

impl StaticTokenDefinition {
    pub fn all() -> &'static [StaticTokenDefinition] {
        &STATIC_DEFINITIONS
    }

    pub fn from_address(address: &Address) -> Option<&'static StaticTokenDefinition> {
        STATIC_DEFINITIONS.iter().find(|def| &def.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_definitions_are_complete() {
        let definitions = StaticTokenDefinition::all();
        assert_eq!(definitions.len(), 6);
        for def in definitions {
            assert!(!def.symbol.is_empty());
            assert!(!def.name.is_empty());
        }
    }

    #[test]
    fn test_no_duplicate_addresses() {
        let unique: HashSet<_> = StaticTokenDefinition::all()
            .iter()
            .map(|def| def.address)
            .collect();
        assert_eq!(unique.len(), StaticTokenDefinition::all().len());
    }

    #[test]
    fn test_lookup_dgd() {
        let dgd = StaticTokenDefinition::from_address(&address!(
            "e0b7927c4af23765cb51314a0e0521a9645f0e2a"
        ))
        .unwrap();
        assert_eq!(dgd.symbol, "DGD");
        assert_eq!(dgd.name, "DGD");
        assert_eq!(dgd.decimals, 9);
    }

    #[test]
    fn test_lookup_aave() {
        let aave = StaticTokenDefinition::from_address(&address!(
            "7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9"
        ))
        .unwrap();
        assert_eq!(aave.symbol, "AAVE");
        assert_eq!(aave.name, "Aave Token");
        assert_eq!(aave.decimals, 18);
    }

    #[test]
    fn test_lookup_the_dao_uses_sixteen_decimals() {
        let dao = StaticTokenDefinition::from_address(&address!(
            "bb9bc244d798123fde783fcc1c72d3bb8c189413"
        ))
        .unwrap();
        assert_eq!(dao.symbol, "TheDAO");
        assert_eq!(dao.decimals, 16);
    }

    #[test]
    fn test_unknown_address() {
        let unknown = address!("0000000000000000000000000000000000000001");
        assert!(StaticTokenDefinition::from_address(&unknown).is_none());
    }
}
