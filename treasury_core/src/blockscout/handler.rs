use std::time::Duration;

use crate::blockscout::dto::{token_balance_items, AddressResponse, TokenBalanceItem};
use crate::error::TreasuryResult;
use crate::helpers::fetch::UpstreamClient;

pub const ADDRESS_TIMEOUT: Duration = Duration::from_secs(8);
pub const TOKEN_BALANCES_TIMEOUT: Duration = Duration::from_secs(12);

const WEI_PER_ETH: f64 = 1e18;

#[derive(Clone, Debug)]
pub struct Blockscout {
    client: UpstreamClient,
    base_url: String,
}

impl Blockscout {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Native ETH balance of `address`.
    pub async fn eth_balance(&self, address: &str) -> TreasuryResult<f64> {
        let url = format!("{}/api/v2/addresses/{}", self.base_url, address);
        let response: AddressResponse = self.client.get_json(&url, ADDRESS_TIMEOUT).await?;
        Ok(response.coin_balance / WEI_PER_ETH)
    }

    pub async fn token_balances(&self, address: &str) -> TreasuryResult<Vec<TokenBalanceItem>> {
        let url = format!("{}/api/v2/addresses/{}/token-balances", self.base_url, address);
        let body = self.client.get_value(&url, TOKEN_BALANCES_TIMEOUT).await?;
        Ok(token_balance_items(body))
    }
}
