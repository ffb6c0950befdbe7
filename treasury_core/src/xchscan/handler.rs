use std::time::Duration;

use crate::error::TreasuryResult;
use crate::helpers::fetch::UpstreamClient;
use crate::xchscan::dto::AccountBalance;

pub const BALANCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Explorer used for the plain XCH balance where Spacescan refuses serverless IPs.
#[derive(Clone, Debug)]
pub struct XchScan {
    client: UpstreamClient,
    base_url: String,
}

impl XchScan {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn balance(&self, address: &str) -> TreasuryResult<f64> {
        let url = format!(
            "{}/account/balance?address={}",
            self.base_url,
            urlencoding::encode(address)
        );
        let balance: AccountBalance = self.client.get_json(&url, BALANCE_TIMEOUT).await?;
        Ok(balance.xch)
    }
}
