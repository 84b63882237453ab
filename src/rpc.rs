//! JSON-RPC 2.0 client
//!
//! Thin envelope layer over [`HttpClient`]: builds requests with increasing
//! ids, unwraps `result`, and turns `error` objects into [`Error::Rpc`].

use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client bound to one endpoint
#[derive(Debug)]
pub struct JsonRpcClient {
    http: HttpClient,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Wrap an HTTP client whose base URL is the RPC endpoint
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            next_id: AtomicU64::new(1),
        }
    }

    /// Call `method` with positional `params`
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };
        debug!(id, method, %params, "Sending RPC request");

        let response: RpcResponse = self.http.post_json("", &request).await?;

        if let Some(err) = response.error {
            return Err(Error::rpc(method, err.code, err.message));
        }
        let result = response
            .result
            .ok_or_else(|| Error::decode(format!("RPC response to '{method}' has no result")))?;

        serde_json::from_value(result)
            .map_err(|e| Error::decode(format!("Unexpected result shape for '{method}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> JsonRpcClient {
        let config = HttpClientConfig::builder()
            .base_url(server.uri())
            .max_retries(0)
            .no_rate_limit()
            .build();
        JsonRpcClient::new(HttpClient::with_config(config).unwrap())
    }

    #[tokio::test]
    async fn test_call_unwraps_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "jsonrpc": "2.0",
                "method": "rooch_getChainID",
                "params": []
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": "4"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let chain_id: String = client.call("rooch_getChainID", json!([])).await.unwrap();
        assert_eq!(chain_id, "4");
    }

    #[tokio::test]
    async fn test_call_ids_increase() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"id": 2})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 2, "result": 2})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"id": 1})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": 1})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first: u64 = client.call("m", json!([])).await.unwrap();
        let second: u64 = client.call("m", json!([])).await.unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn test_call_maps_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32602, "message": "invalid cursor"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.call::<Value>("rooch_getTransactionsByOrder", json!([])).await.unwrap_err();
        match err {
            Error::Rpc {
                method,
                code,
                message,
            } => {
                assert_eq!(method, "rooch_getTransactionsByOrder");
                assert_eq!(code, -32602);
                assert_eq!(message, "invalid cursor");
            }
            other => panic!("Expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_without_result_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.call::<Value>("m", json!([])).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
