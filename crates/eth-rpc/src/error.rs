use thiserror::Error;

/// An error object carried by a single JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rpc call failed with code {code}: {message}")]
pub struct RpcCallError {
    pub code: i64,
    pub message: String,
}

/// Batch-level RPC errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Call(#[from] RpcCallError),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_error_display() {
        let err = RpcCallError {
            code: -32601,
            message: "method not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "rpc call failed with code -32601: method not found"
        );
    }

    #[test]
    fn call_error_converts_transparently() {
        let err: RpcError = RpcCallError {
            code: 3,
            message: "reverted".into(),
        }
        .into();
        assert_eq!(err.to_string(), "rpc call failed with code 3: reverted");
    }
}
