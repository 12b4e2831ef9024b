//! JSON-RPC batching for Ethereum nodes.
//!
//! This crate builds batched JSON-RPC request bodies, correlates the reply
//! array by request id, and decodes each result with its call's decoder.
//! It deliberately owns no HTTP machinery: callers provide an
//! [`RpcTransport`] that performs the single round trip.

pub mod batch;
pub mod error;
pub mod request;

pub use batch::{execute_batch, Batch, BatchResult, BlockTag, EthCall, EthValue, RpcTransport};
pub use error::{RpcCallError, RpcError};
