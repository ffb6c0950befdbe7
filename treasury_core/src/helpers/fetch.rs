use std::time::Duration;

use log::{debug, warn};
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{TreasuryError, TreasuryResult};
use crate::helpers::defaults;

/// Outbound HTTP with a hard deadline on every call. The deadline covers
/// connecting, headers and body; when it elapses the request future is dropped,
/// which aborts the underlying connection.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new() -> TreasuryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(defaults::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, timeout: Duration) -> TreasuryResult<T> {
        self.send_json(self.client.get(url), url, timeout).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> TreasuryResult<T> {
        self.send_json(self.client.post(url).json(body), url, timeout).await
    }

    /// Sends an arbitrary request (custom headers, methods) under the same deadline.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> TreasuryResult<T> {
        let call = async {
            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(TreasuryError::RateLimited { url: url.to_string() });
            }
            if !status.is_success() {
                return Err(TreasuryError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice::<T>(&bytes)?)
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TreasuryError::Timeout {
                url: url.to_string(),
                after: timeout,
            }),
        }
    }

    /// Best-effort GET: any failure is logged and becomes `None`.
    pub async fn try_get_json<T: DeserializeOwned>(&self, url: &str, timeout: Duration) -> Option<T> {
        match self.get_json::<T>(url, timeout).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("upstream call failed: {}", e);
                None
            }
        }
    }

    /// Raw JSON passthrough used by the proxy endpoints.
    pub async fn get_value(&self, url: &str, timeout: Duration) -> TreasuryResult<Value> {
        debug!("proxying {}", url);
        self.get_json::<Value>(url, timeout).await
    }
}
