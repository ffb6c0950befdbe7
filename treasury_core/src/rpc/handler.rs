use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, warn};
use serde_json::{json, Value};

use crate::helpers::{
    fetch::UpstreamClient,
    rate_limit::{Lane, RateLimiter},
};
use crate::rpc::{
    abi,
    dto::{EthCall, RpcRequest, RpcResponse},
};

pub const SINGLE_TIMEOUT: Duration = Duration::from_secs(6);
pub const BATCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_ATTEMPTS: usize = 3;
pub const ROTATION_PAUSE: Duration = Duration::from_millis(150);

/// Round-robin over a fixed list of JSON-RPC endpoints. Losing the cursor only
/// resets the rotation.
#[derive(Debug)]
pub struct RpcRotation {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl RpcRotation {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Option<&str> {
        if self.endpoints.is_empty() {
            return None;
        }
        let index = self.cursor.load(Ordering::Relaxed) % self.endpoints.len();
        self.endpoints.get(index).map(String::as_str)
    }

    pub fn advance(&self) {
        self.cursor.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[derive(Debug)]
pub struct RpcClient {
    client: UpstreamClient,
    rotation: RpcRotation,
    limiter: Arc<RateLimiter>,
}

impl RpcClient {
    pub fn new(client: UpstreamClient, endpoints: Vec<String>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            rotation: RpcRotation::new(endpoints),
            limiter,
        }
    }

    pub fn rotation(&self) -> &RpcRotation {
        &self.rotation
    }

    /// Submits every call as one JSON-RPC batch to the current endpoint.
    /// Results come back in the order of `calls`. If the batch as a whole
    /// fails, every slot is `None` and the next batch goes to another node.
    pub async fn batch(&self, calls: &[EthCall]) -> Vec<Option<String>> {
        if calls.is_empty() {
            return Vec::new();
        }
        let Some(endpoint) = self.rotation.current() else {
            return vec![None; calls.len()];
        };

        self.limiter.acquire(Lane::BaseRpc).await;

        let body: Vec<RpcRequest> = calls.iter().map(EthCall::request).collect();
        let responses = match self.client.post_json::<_, Value>(endpoint, &body, BATCH_TIMEOUT).await {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("[RPC] batch of {} on {}: not an array", calls.len(), endpoint);
                self.rotation.advance();
                return vec![None; calls.len()];
            }
            Err(e) => {
                warn!("[RPC] batch of {} on {} failed: {}", calls.len(), endpoint, e);
                self.rotation.advance();
                return vec![None; calls.len()];
            }
        };

        let by_id: HashMap<u64, Option<String>> = responses
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RpcResponse>(item).ok())
            .filter_map(|response| response.id.as_u64().map(|id| (id, response.hex_result())))
            .collect();

        debug!("[RPC] batch of {} on {}: {} answered", calls.len(), endpoint, by_id.len());

        calls
            .iter()
            .map(|call| by_id.get(&call.id).cloned().flatten())
            .collect()
    }

    /// Single request with failover: up to three attempts, moving to the next
    /// endpoint after each failure.
    pub async fn request(&self, method: &str, params: Value) -> Option<Value> {
        let request = RpcRequest::new(1, method, params);

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(ROTATION_PAUSE).await;
            }
            let endpoint = self.rotation.current()?;

            match self
                .client
                .post_json::<_, RpcResponse>(endpoint, &request, SINGLE_TIMEOUT)
                .await
            {
                Ok(response) => {
                    if let Some(error) = response.error {
                        warn!("[RPC] {} on {}: error {} {}", method, endpoint, error.code, error.message);
                        self.rotation.advance();
                        continue;
                    }
                    return response.result.filter(|r| !r.is_null());
                }
                Err(e) => {
                    warn!("[RPC] {} on {} attempt {}: {}", method, endpoint, attempt + 1, e);
                    self.rotation.advance();
                }
            }
        }

        None
    }

    pub async fn eth_call(&self, to: &str, data: &str) -> Option<String> {
        let result = self
            .request("eth_call", json!([{"to": to, "data": data}, "latest"]))
            .await?;
        result.as_str().map(str::to_string)
    }

    /// Native balance in ETH.
    pub async fn eth_get_balance(&self, address: &str) -> Option<f64> {
        let result = self.request("eth_getBalance", json!([address, "latest"])).await?;
        let wei = abi::quantity(result.as_str()?)?;
        Some(abi::scaled(wei, 18))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::rate_limit::RateLimits;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn rpc(endpoints: Vec<String>) -> RpcClient {
        RpcClient::new(
            UpstreamClient::new().unwrap(),
            endpoints,
            Arc::new(RateLimiter::new(RateLimits::unlimited())),
        )
    }

    /// Answers every call of a batch with its own id encoded as a word, except
    /// id 3 which gets an RPC error.
    fn echo_batch(req: &Request) -> ResponseTemplate {
        let calls: Vec<Value> = serde_json::from_slice(&req.body).unwrap();
        let answers: Vec<Value> = calls
            .iter()
            .rev()
            .map(|call| {
                let id = call["id"].as_u64().unwrap();
                if id == 3 {
                    json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32000, "message": "execution reverted"}})
                } else {
                    json!({"jsonrpc": "2.0", "id": id, "result": format!("0x{:064x}", id)})
                }
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(answers)
    }

    #[tokio::test]
    async fn test_batch_maps_results_back_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(echo_batch)
            .expect(1)
            .mount(&server)
            .await;

        let client = rpc(vec![server.uri()]);
        let calls: Vec<EthCall> = (0..5).map(|id| EthCall::new(id, "0xpool", abi::TOKEN0)).collect();
        let results = client.batch(&calls).await;

        assert_eq!(results.len(), 5);
        assert_eq!(results[1], Some(format!("0x{:064x}", 1)));
        assert_eq!(results[3], None);
        assert_eq!(results[4], Some(format!("0x{:064x}", 4)));
    }

    #[tokio::test]
    async fn test_failed_batch_is_all_none_and_rotates() {
        let down = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&down)
            .await;
        let up = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(echo_batch)
            .expect(1)
            .mount(&up)
            .await;

        let client = rpc(vec![down.uri(), up.uri()]);
        let calls = vec![EthCall::new(0, "0xpool", abi::TOKEN0), EthCall::new(1, "0xpool", abi::TOKEN1)];

        assert_eq!(client.batch(&calls).await, vec![None, None]);
        assert_eq!(client.batch(&calls).await[1], Some(format!("0x{:064x}", 1)));
    }

    #[tokio::test]
    async fn test_request_fails_over_to_next_endpoint() {
        let broken = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "error": {"code": 429, "message": "rate limited"}
            })))
            .expect(1)
            .mount(&broken)
            .await;
        let healthy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": "0xde0b6b3a7640000"
            })))
            .expect(1)
            .mount(&healthy)
            .await;

        let client = rpc(vec![broken.uri(), healthy.uri()]);
        assert_eq!(client.eth_get_balance("0xwallet").await, Some(1.0));
    }

    #[tokio::test]
    async fn test_request_gives_up_after_three_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = rpc(vec![server.uri()]);
        assert_eq!(client.eth_call("0xpool", abi::DECIMALS).await, None);
    }

    #[test]
    fn test_rotation_wraps() {
        let rotation = RpcRotation::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(rotation.current(), Some("a"));
        rotation.advance();
        assert_eq!(rotation.current(), Some("b"));
        rotation.advance();
        assert_eq!(rotation.current(), Some("a"));
        assert_eq!(RpcRotation::new(vec![]).current(), None);
    }
}
