//! JSON-RPC `eth_call` client for pool contract state.

use super::{ContractError, PoolContract, TickInfo};
use crate::domain::address_key;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// `feeGrowthGlobal0X128()`
const FEE_GROWTH_GLOBAL0_SELECTOR: [u8; 4] = [0xf3, 0x05, 0x83, 0x99];
/// `feeGrowthGlobal1X128()`
const FEE_GROWTH_GLOBAL1_SELECTOR: [u8; 4] = [0x46, 0x14, 0x13, 0x19];
/// `ticks(int24)`
const TICKS_SELECTOR: [u8; 4] = [0xf3, 0x0d, 0xba, 0x93];

/// Words returned by `ticks(int24)`.
const TICKS_RETURN_WORDS: usize = 8;

/// Pool contract reader backed by an Ethereum JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcPoolContract {
    client: Client,
    rpc_url: String,
    max_elapsed: Duration,
}

impl RpcPoolContract {
    /// Create a new reader against `rpc_url`.
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            max_elapsed: Duration::from_secs(30),
        }
    }

    /// Bound the total time spent retrying one call.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// `eth_call` at the given block, returning the raw return data.
    async fn eth_call(
        &self,
        to: &Address,
        calldata: &[u8],
        block_number: u64,
    ) -> Result<Vec<u8>, ContractError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": address_key(to),
                    "data": format!("0x{}", hex::encode(calldata)),
                },
                format!("0x{:x}", block_number),
            ],
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        let response = retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(ContractError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(ContractError::HttpError {
                    status: status.as_u16(),
                    message: "Server unavailable".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(ContractError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(ContractError::ParseError(e.to_string())))
        })
        .await?;

        parse_call_result(&response)
    }
}

#[async_trait]
impl PoolContract for RpcPoolContract {
    async fn fee_growth_globals(
        &self,
        pool: &Address,
        block_number: u64,
    ) -> Result<(U256, U256), ContractError> {
        debug!(pool = %pool, block = block_number, "Querying global fee growth");
        let global0 = self
            .eth_call(pool, &FEE_GROWTH_GLOBAL0_SELECTOR, block_number)
            .await?;
        let global1 = self
            .eth_call(pool, &FEE_GROWTH_GLOBAL1_SELECTOR, block_number)
            .await?;
        Ok((word(&global0, 0)?, word(&global1, 0)?))
    }

    async fn ticks(
        &self,
        pool: &Address,
        tick_idx: i32,
        block_number: u64,
    ) -> Result<TickInfo, ContractError> {
        debug!(pool = %pool, tick = tick_idx, block = block_number, "Querying tick");
        let data = self
            .eth_call(pool, &encode_ticks_call(tick_idx), block_number)
            .await?;
        if data.len() < TICKS_RETURN_WORDS * 32 {
            return Err(ContractError::ParseError(format!(
                "ticks({}) returned {} bytes",
                tick_idx,
                data.len()
            )));
        }
        Ok(TickInfo::new(word(&data, 2)?, word(&data, 3)?))
    }
}

/// Calldata for `ticks(int24)`: the index sign-extended to one ABI word.
fn encode_ticks_call(tick_idx: i32) -> Vec<u8> {
    let mut word = if tick_idx < 0 { [0xffu8; 32] } else { [0u8; 32] };
    word[28..].copy_from_slice(&tick_idx.to_be_bytes());

    let mut calldata = Vec::with_capacity(36);
    calldata.extend_from_slice(&TICKS_SELECTOR);
    calldata.extend_from_slice(&word);
    calldata
}

/// Extract the hex return data from a JSON-RPC response envelope.
fn parse_call_result(response: &serde_json::Value) -> Result<Vec<u8>, ContractError> {
    if let Some(error) = response.get("error") {
        return Err(ContractError::RpcError {
            code: error.get("code").and_then(|c| c.as_i64()).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let result = response
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| ContractError::ParseError("Missing result field".to_string()))?;
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits).map_err(|e| ContractError::ParseError(format!("Invalid hex: {}", e)))
}

/// The `index`-th 32-byte word of ABI return data.
fn word(data: &[u8], index: usize) -> Result<U256, ContractError> {
    let start = index * 32;
    data.get(start..start + 32)
        .map(U256::from_be_slice)
        .ok_or_else(|| {
            ContractError::ParseError(format!(
                "return data has {} bytes, word {} requested",
                data.len(),
                index
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ticks_call_positive() {
        let calldata = encode_ticks_call(60);
        assert_eq!(calldata.len(), 36);
        assert_eq!(&calldata[..4], &TICKS_SELECTOR);
        assert!(calldata[4..35].iter().all(|b| *b == 0));
        assert_eq!(calldata[35], 60);
    }

    #[test]
    fn test_encode_ticks_call_negative_is_sign_extended() {
        let calldata = encode_ticks_call(-1);
        assert!(calldata[4..].iter().all(|b| *b == 0xff));

        let calldata = encode_ticks_call(-887_220);
        assert_eq!(
            hex::encode(&calldata[4..]),
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff2764c"
        );
    }

    #[test]
    fn test_parse_call_result_words() {
        let mut data = vec![0u8; 64];
        data[31] = 7;
        data[63] = 9;
        let response = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("0x{}", hex::encode(&data)),
        });

        let bytes = parse_call_result(&response).unwrap();
        assert_eq!(word(&bytes, 0).unwrap(), U256::from(7u8));
        assert_eq!(word(&bytes, 1).unwrap(), U256::from(9u8));
        assert!(word(&bytes, 2).is_err());
    }

    #[test]
    fn test_parse_call_result_rpc_error() {
        let response = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "execution reverted"},
        });

        match parse_call_result(&response) {
            Err(ContractError::RpcError { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "execution reverted");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_result_missing_result() {
        let response = serde_json::json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(
            parse_call_result(&response),
            Err(ContractError::ParseError(_))
        ));
    }
}
