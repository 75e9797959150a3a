//! Minimal JSON-RPC transport for read-only contract calls
//!
//! Calldata and return values are handled by `alloy-sol-types`; this module
//! only moves the bytes over `eth_call`.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{hex, Address};
use alloy_sol_types::{sol, SolCall};
use serde_json::{json, Value};

use oracle_core::{SourceError, SourceResult};

sol! {
    /// Uniswap V2 pair, the subset needed for spot pricing
    #[derive(Debug)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

/// `eth_call` client bound to one endpoint
#[derive(Debug)]
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Execute a typed contract call at the latest block
    pub async fn call<C: SolCall>(&self, to: Address, call: C) -> SourceResult<C::Return> {
        let output = self.eth_call(to, &call.abi_encode()).await?;
        decode_return::<C>(&output)
    }

    async fn eth_call(&self, to: Address, calldata: &[u8]) -> SourceResult<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to.to_string(), "data": hex::encode_prefixed(calldata) }, "latest"]
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        parse_call_result(&body)
    }
}

/// Extract the output bytes of an `eth_call` response
pub fn parse_call_result(body: &Value) -> SourceResult<Vec<u8>> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(SourceError::Rpc(message.to_string()));
    }

    let result = body
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| SourceError::Decode("missing result".to_string()))?;

    hex::decode(result.strip_prefix("0x").unwrap_or(result)).map_err(|e| SourceError::Decode(e.to_string()))
}

/// ABI-decode the return data of `C`
pub fn decode_return<C: SolCall>(output: &[u8]) -> SourceResult<C::Return> {
    C::abi_decode_returns(output, true).map_err(|e| SourceError::Decode(e.to_string()))
}
