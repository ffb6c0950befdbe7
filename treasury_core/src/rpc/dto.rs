use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One read-only contract call inside a batch. `id` is chosen by the caller so
/// multi-call groups can be reassembled arithmetically.
#[derive(Debug, Clone, PartialEq)]
pub struct EthCall {
    pub id: u64,
    pub to: String,
    pub data: String,
}

impl EthCall {
    pub fn new(id: u64, to: &str, data: &str) -> Self {
        Self {
            id,
            to: to.to_string(),
            data: data.to_string(),
        }
    }

    pub fn request(&self) -> RpcRequest {
        RpcRequest::new(self.id, "eth_call", json!([{"to": self.to, "data": self.data}, "latest"]))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RpcResponse {
    /// Hex payload of a successful call, `None` on error or an empty result.
    pub fn hex_result(&self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        match &self.result {
            Some(Value::String(hex)) if !hex.is_empty() => Some(hex.clone()),
            _ => None,
        }
    }
}
