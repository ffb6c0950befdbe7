use std::time::Duration;

use log::warn;

use crate::coingecko::dto::SimplePriceResponse;
use crate::helpers::{dto::PriceSource, fetch::UpstreamClient};

pub const CHIA: &str = "chia";
pub const ETHEREUM: &str = "ethereum";

#[derive(Clone, Debug)]
pub struct CoinGecko {
    client: UpstreamClient,
    base_url: String,
}

impl CoinGecko {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Live USD quote, `None` unless the provider answered with a positive price.
    pub async fn usd_price(&self, coin_id: &str, timeout: Duration) -> Option<f64> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            urlencoding::encode(coin_id)
        );
        let response = self.client.try_get_json::<SimplePriceResponse>(&url, timeout).await?;

        response
            .get(coin_id)
            .map(|quote| quote.usd)
            .filter(|price| *price > 0.0)
    }

    /// Base/USD rate shared by every per-asset computation of a request. Never
    /// fails: an unresolved quote becomes `fallback`.
    pub async fn usd_price_or(&self, coin_id: &str, fallback: f64, timeout: Duration) -> (f64, PriceSource) {
        match self.usd_price(coin_id, timeout).await {
            Some(price) => (price, PriceSource::Coingecko),
            None => {
                warn!("[COINGECKO] no {} quote, using fallback {}", coin_id, fallback);
                (fallback, PriceSource::Fallback)
            }
        }
    }
}
