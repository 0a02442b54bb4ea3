//! Minimal JSON-RPC 2.0 client over HTTP

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error ({}): {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response: JsonRpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to daemon")?
            .json()
            .await
            .context("Failed to parse response")?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        // `null` is a valid result (e.g. no agreement yet)
        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Attach the session token to an object of params
pub fn with_token(token: &str, params: Value) -> Value {
    let mut params = match params {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    params.insert("session_token".to_string(), Value::String(token.to_string()));
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_token_keeps_params() {
        let params = with_token("tok-1", json!({ "venture_id": "v-1" }));
        assert_eq!(params, json!({ "venture_id": "v-1", "session_token": "tok-1" }));
    }

    #[test]
    fn test_with_token_on_empty_params() {
        assert_eq!(with_token("tok-1", Value::Null), json!({ "session_token": "tok-1" }));
    }

    #[test]
    fn test_error_display_carries_code() {
        let err = JsonRpcError {
            code: 4005,
            message: "mentor cannot triage".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error (4005): mentor cannot triage");
    }
}
