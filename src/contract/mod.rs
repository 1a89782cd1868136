//! Read-only queries against a pool contract at a given block.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod rpc;

pub use mock::MockPoolContract;
pub use rpc::RpcPoolContract;

/// Per-tick state as reported by the pool contract.
///
/// Only the fee-growth-outside accumulators are consumed by the indexer; a
/// tick the contract never initialized reports zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInfo {
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
}

impl TickInfo {
    pub fn new(fee_growth_outside_0_x128: U256, fee_growth_outside_1_x128: U256) -> Self {
        Self {
            fee_growth_outside_0_x128,
            fee_growth_outside_1_x128,
        }
    }
}

/// Contract state reader.
///
/// Every query is evaluated against the state at the end of `block_number`,
/// the block of the event being processed.
#[async_trait]
pub trait PoolContract: Send + Sync + fmt::Debug {
    /// The pool's global fee-growth accumulators `(token0, token1)`.
    async fn fee_growth_globals(
        &self,
        pool: &Address,
        block_number: u64,
    ) -> Result<(U256, U256), ContractError>;

    /// The contract's record for one tick.
    async fn ticks(
        &self,
        pool: &Address,
        tick_idx: i32,
        block_number: u64,
    ) -> Result<TickInfo, ContractError>;
}

/// Error type for contract queries.
#[derive(Debug, Clone)]
pub enum ContractError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// The node answered with a JSON-RPC error object
    RpcError { code: i64, message: String },
    /// Parsing error (invalid JSON or malformed return data)
    ParseError(String),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ContractError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ContractError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            ContractError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ContractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_display() {
        let err = ContractError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = ContractError::HttpError {
            status: 429,
            message: "Too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too many requests");

        let err = ContractError::RpcError {
            code: -32000,
            message: "header not found".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32000: header not found");

        let err = ContractError::ParseError("short return data".to_string());
        assert_eq!(err.to_string(), "Parse error: short return data");
    }

    #[test]
    fn test_tick_info_default_is_uninitialized() {
        let info = TickInfo::default();
        assert_eq!(info, TickInfo::new(U256::ZERO, U256::ZERO));
    }
}
