//! Page sources
//!
//! A [`PageSource`] answers a [`PageRequest`] with one [`ResultPage`]. The
//! result store is written against this trait so it can be driven by the
//! node or by an in-memory source in tests.

use crate::config::AppConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{PageRequest, ResultPage};
use crate::rpc::JsonRpcClient;
use crate::types::TransactionView;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// JSON-RPC method listing transactions by sequence order
pub const GET_TRANSACTIONS_BY_ORDER: &str = "rooch_getTransactionsByOrder";

/// Anything that can serve a page of transactions
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the rows starting at `request.offset`
    async fn fetch_page(&self, request: PageRequest) -> Result<ResultPage<TransactionView>>;
}

/// Transactions served by a Rooch node
#[derive(Debug)]
pub struct RoochTransactionSource {
    rpc: JsonRpcClient,
    descending: bool,
}

impl RoochTransactionSource {
    /// Create a source over an RPC client
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self {
            rpc,
            descending: true,
        }
    }

    /// Connect to the node named in the config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http_config())?;
        debug!(
            url = %config.rpc.url,
            rate_limited = http.has_rate_limiter(),
            descending = config.rpc.descending,
            "Connecting to node"
        );
        Ok(Self::new(JsonRpcClient::new(http)).with_descending(config.rpc.descending))
    }

    /// Set whether the node should list newest transactions first
    #[must_use]
    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}

#[async_trait]
impl PageSource for RoochTransactionSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<ResultPage<TransactionView>> {
        let params = json!([
            request.offset.to_string(),
            request.limit.to_string(),
            self.descending
        ]);
        let page: ResultPage<TransactionView> =
            self.rpc.call(GET_TRANSACTIONS_BY_ORDER, params).await?;
        debug!(
            %request,
            rows = page.len(),
            has_next_page = page.has_next_page,
            "Fetched transaction page"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpClient, HttpClientConfig};
    use serde_json::Value;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tx_json(order: u64) -> Value {
        json!({
            "sequence_info": {"tx_order": order.to_string()},
            "execution_info": {
                "tx_hash": format!("0x{order:064x}"),
                "gas_used": "100",
                "status": {"type": "executed"}
            },
            "transaction": {"action_type": "function", "sender": "0x42"}
        })
    }

    fn source_for(server: &MockServer, descending: bool) -> RoochTransactionSource {
        let config = HttpClientConfig::builder()
            .base_url(server.uri())
            .max_retries(0)
            .no_rate_limit()
            .build();
        let rpc = JsonRpcClient::new(HttpClient::with_config(config).unwrap());
        RoochTransactionSource::new(rpc).with_descending(descending)
    }

    #[tokio::test]
    async fn test_fetch_page_sends_cursor_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": GET_TRANSACTIONS_BY_ORDER,
                "params": ["50", "25", false]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "data": [tx_json(50), tx_json(51)],
                    "next_cursor": "51",
                    "has_next_page": true
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server, false);
        let page = source
            .fetch_page(PageRequest {
                offset: 50,
                limit: 25,
            })
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert!(page.has_next_page);
        assert_eq!(page.next_cursor, Some(51));
        assert_eq!(page.data[1].sequence_info.tx_order, 51);
    }

    #[tokio::test]
    async fn test_fetch_page_last_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {"data": [], "next_cursor": null, "has_next_page": false}
            })))
            .mount(&server)
            .await;

        let page = source_for(&server, true)
            .fetch_page(PageRequest {
                offset: 0,
                limit: 10,
            })
            .await
            .unwrap();
        assert!(page.is_empty());
        assert!(!page.has_next_page);
        assert!(page.next_cursor.is_none());
    }
}
