//! The batch coordinator: many calls, one round trip.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde_json::{json, Value};

use crate::error::{RpcCallError, RpcError};
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// The default block parameter accepted by most read methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    Earliest,
    #[default]
    Latest,
    Pending,
}

impl BlockTag {
    fn as_str(self) -> &'static str {
        match self {
            BlockTag::Earliest => "earliest",
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
        }
    }
}

/// One JSON-RPC call with a typed result.
///
/// Each variant owns its parameters and knows how to decode its `result`
/// member into an [`EthValue`].
#[derive(Debug, Clone)]
pub enum EthCall {
    /// `eth_getBalance`
    GetBalance { address: Address, block: BlockTag },
    /// `eth_blockNumber`
    BlockNumber,
    /// `eth_call` against a contract.
    Call {
        to: Address,
        data: Bytes,
        block: BlockTag,
    },
    /// `eth_sendRawTransaction` with signed RLP bytes.
    SendRawTransaction { raw: Bytes },
    /// `eth_getTransactionCount`
    GetTransactionCount { address: Address, block: BlockTag },
    /// `eth_gasPrice`
    GasPrice,
    /// `eth_estimateGas`
    EstimateGas {
        from: Option<Address>,
        to: Option<Address>,
        value: Option<U256>,
        data: Option<Bytes>,
    },
}

/// A decoded JSON-RPC result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthValue {
    /// Account balance in wei.
    Wei(U256),
    BlockNumber(u64),
    /// Return data of an `eth_call`.
    CallData(Bytes),
    TxHash(B256),
    Nonce(u64),
    GasPrice(U256),
    GasEstimate(U256),
}

impl EthCall {
    fn method(&self) -> &'static str {
        match self {
            EthCall::GetBalance { .. } => "eth_getBalance",
            EthCall::BlockNumber => "eth_blockNumber",
            EthCall::Call { .. } => "eth_call",
            EthCall::SendRawTransaction { .. } => "eth_sendRawTransaction",
            EthCall::GetTransactionCount { .. } => "eth_getTransactionCount",
            EthCall::GasPrice => "eth_gasPrice",
            EthCall::EstimateGas { .. } => "eth_estimateGas",
        }
    }

    fn params(&self) -> Vec<Value> {
        match self {
            EthCall::GetBalance { address, block } => {
                vec![json!(hex_address(address)), json!(block.as_str())]
            }
            EthCall::BlockNumber => vec![],
            EthCall::Call { to, data, block } => vec![
                json!({ "to": hex_address(to), "data": hex_bytes(data) }),
                json!(block.as_str()),
            ],
            EthCall::SendRawTransaction { raw } => vec![json!(hex_bytes(raw))],
            EthCall::GetTransactionCount { address, block } => {
                vec![json!(hex_address(address)), json!(block.as_str())]
            }
            EthCall::GasPrice => vec![],
            EthCall::EstimateGas {
                from,
                to,
                value,
                data,
            } => {
                let mut obj = serde_json::Map::new();
                if let Some(from) = from {
                    obj.insert("from".into(), json!(hex_address(from)));
                }
                if let Some(to) = to {
                    obj.insert("to".into(), json!(hex_address(to)));
                }
                if let Some(value) = value {
                    obj.insert("value".into(), json!(hex_quantity(value)));
                }
                if let Some(data) = data {
                    obj.insert("data".into(), json!(hex_bytes(data)));
                }
                vec![Value::Object(obj)]
            }
        }
    }

    fn decode(&self, result: &Value) -> Result<EthValue, RpcError> {
        match self {
            EthCall::GetBalance { .. } => Ok(EthValue::Wei(parse_quantity(result)?)),
            EthCall::BlockNumber => Ok(EthValue::BlockNumber(parse_u64(result)?)),
            EthCall::Call { .. } => Ok(EthValue::CallData(parse_bytes(result)?)),
            EthCall::SendRawTransaction { .. } => Ok(EthValue::TxHash(parse_hash(result)?)),
            EthCall::GetTransactionCount { .. } => Ok(EthValue::Nonce(parse_u64(result)?)),
            EthCall::GasPrice => Ok(EthValue::GasPrice(parse_quantity(result)?)),
            EthCall::EstimateGas { .. } => Ok(EthValue::GasEstimate(parse_quantity(result)?)),
        }
    }
}

/// An ordered list of calls sent as one JSON array.
///
/// Call ids are assigned from the call's position, so results can be put
/// back into submission order no matter how the server orders its reply.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    calls: Vec<EthCall>,
}

/// Per-call outcomes of a batch, in submission order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    entries: Vec<Result<EthValue, RpcCallError>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(call: EthCall) -> Self {
        Self { calls: vec![call] }
    }

    /// Fetches everything needed to parameterize a transaction — gas
    /// estimate, gas price and account nonce — in one round trip.
    /// Result order: [`EthValue::GasEstimate`], [`EthValue::GasPrice`],
    /// [`EthValue::Nonce`].
    pub fn transaction_parameters(
        from: Address,
        to: Address,
        value: Option<U256>,
        data: Option<Bytes>,
    ) -> Self {
        let mut batch = Self::new();
        batch.push(EthCall::EstimateGas {
            from: Some(from),
            to: Some(to),
            value,
            data,
        });
        batch.push(EthCall::GasPrice);
        batch.push(EthCall::GetTransactionCount {
            address: from,
            block: BlockTag::Pending,
        });
        batch
    }

    /// Appends a call and returns its position in the batch.
    pub fn push(&mut self, call: EthCall) -> usize {
        self.calls.push(call);
        self.calls.len() - 1
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Serializes the batch as a single JSON array request body.
    pub fn request_body(&self) -> Result<String, RpcError> {
        let requests: Vec<JsonRpcRequest> = self
            .calls
            .iter()
            .enumerate()
            .map(|(id, call)| JsonRpcRequest::new(id as u64, call.method(), call.params()))
            .collect();
        Ok(serde_json::to_string(&requests)?)
    }

    /// Correlates a response array by id and decodes every result.
    ///
    /// The wire order of the responses is irrelevant; entries come back in
    /// submission order. A missing, duplicated or unknown id fails the whole
    /// batch, while a per-call error object only fails its own entry.
    pub fn decode_response(&self, body: &str) -> Result<BatchResult, RpcError> {
        let responses: Vec<JsonRpcResponse> = serde_json::from_str(body)?;
        if responses.len() != self.calls.len() {
            return Err(RpcError::InvalidResponse(format!(
                "expected {} responses, got {}",
                self.calls.len(),
                responses.len()
            )));
        }

        let mut by_id: HashMap<u64, JsonRpcResponse> = HashMap::with_capacity(responses.len());
        for response in responses {
            if by_id.insert(response.id, response).is_some() {
                return Err(RpcError::InvalidResponse("duplicate response id".into()));
            }
        }

        let mut entries = Vec::with_capacity(self.calls.len());
        for (id, call) in self.calls.iter().enumerate() {
            let response = by_id.remove(&(id as u64)).ok_or_else(|| {
                RpcError::InvalidResponse(format!("no response for id {id}"))
            })?;

            if let Some(err) = response.error {
                entries.push(Err(RpcCallError {
                    code: err.code,
                    message: err.message,
                }));
                continue;
            }

            let result = response.result.ok_or_else(|| {
                RpcError::InvalidResponse(format!("response {id} has neither result nor error"))
            })?;
            entries.push(Ok(call.decode(&result)?));
        }

        Ok(BatchResult { entries })
    }
}

impl BatchResult {
    /// All decoded values; fails with the first per-call error.
    pub fn into_values(self) -> Result<Vec<EthValue>, RpcError> {
        self.entries
            .into_iter()
            .map(|entry| entry.map_err(RpcError::from))
            .collect()
    }

    /// Per-call outcomes for callers that want partial results.
    pub fn into_entries(self) -> Vec<Result<EthValue, RpcCallError>> {
        self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Result<EthValue, RpcCallError>> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The single network exchange a batch needs.
///
/// Implementations post `request_body` to a node and return the raw
/// response body. Retry policy belongs to the caller, not the coordinator.
pub trait RpcTransport {
    fn execute(&self, request_body: &str) -> Result<String, RpcError>;
}

/// Runs a batch over the given transport: one request, one response array.
pub fn execute_batch<T: RpcTransport>(transport: &T, batch: &Batch) -> Result<BatchResult, RpcError> {
    let body = batch.request_body()?;
    let response = transport.execute(&body)?;
    batch.decode_response(&response)
}

fn hex_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn hex_bytes(bytes: &Bytes) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn hex_quantity(value: &U256) -> String {
    format!("0x{value:x}")
}

fn expect_hex_str<'a>(value: &'a Value) -> Result<&'a str, RpcError> {
    let s = value
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected hex string, got {value}")))?;
    s.strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing 0x prefix: {s}")))
}

fn parse_quantity(value: &Value) -> Result<U256, RpcError> {
    let hex_part = expect_hex_str(value)?;
    U256::from_str_radix(hex_part, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("bad quantity: {e}")))
}

fn parse_u64(value: &Value) -> Result<u64, RpcError> {
    let hex_part = expect_hex_str(value)?;
    u64::from_str_radix(hex_part, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("bad quantity: {e}")))
}

fn parse_bytes(value: &Value) -> Result<Bytes, RpcError> {
    let hex_part = expect_hex_str(value)?;
    let bytes = hex::decode(hex_part)
        .map_err(|e| RpcError::InvalidResponse(format!("bad hex data: {e}")))?;
    Ok(Bytes::from(bytes))
}

fn parse_hash(value: &Value) -> Result<B256, RpcError> {
    let hex_part = expect_hex_str(value)?;
    let bytes = hex::decode(hex_part)
        .map_err(|e| RpcError::InvalidResponse(format!("bad hex data: {e}")))?;
    if bytes.len() != 32 {
        return Err(RpcError::InvalidResponse(format!(
            "expected 32-byte hash, got {} bytes",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}
