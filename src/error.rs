use crate::contract::ContractError;
use crate::domain::DecimalError;
use crate::store::StoreError;
use alloy_primitives::Address;
use thiserror::Error;

/// Failure while applying one pool event.
///
/// Any error aborts the event; entity writes already made for it are not
/// rolled back.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Missing {entity} record: {key}")]
    MissingRecord { entity: &'static str, key: String },
    #[error("Pool {pool} has unsupported fee tier {fee_tier}")]
    UnsupportedFeeTier { pool: Address, fee_tier: u32 },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),
    #[error("Decimal error: {0}")]
    Decimal(#[from] DecimalError),
}

impl IndexerError {
    pub fn missing(entity: &'static str, key: impl ToString) -> Self {
        IndexerError::MissingRecord {
            entity,
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_display() {
        let err = IndexerError::missing("pool", "0xabc");
        assert_eq!(err.to_string(), "Missing pool record: 0xabc");
    }

    #[test]
    fn test_wraps_contract_error() {
        let err: IndexerError = ContractError::ParseError("bad".to_string()).into();
        assert!(matches!(err, IndexerError::Contract(_)));
        assert_eq!(err.to_string(), "Contract error: Parse error: bad");
    }
}
