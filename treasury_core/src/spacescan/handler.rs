use std::time::Duration;

use log::{debug, info};
use serde_json::Value;

use crate::error::TreasuryResult;
use crate::helpers::{
    dto::{PriceQuote, PriceSource},
    fetch::UpstreamClient,
};
use crate::spacescan::dto::{
    AddressEndpoint, CatBalance, CatInfoResponse, NftBalanceResponse, RawNft, TokenBalanceResponse,
    XchBalanceResponse,
};

pub const PATH_PROXY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct Spacescan {
    client: UpstreamClient,
    base_url: String,
}

impl Spacescan {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn xch_balance(&self, address: &str, timeout: Duration) -> TreasuryResult<f64> {
        let url = format!("{}/address/xch-balance/{}", self.base_url, address);
        let response: XchBalanceResponse = self.client.get_json(&url, timeout).await?;
        Ok(response.xch)
    }

    /// CAT balances of a wallet. 429s surface as `RateLimited` so callers can retry.
    pub async fn token_balance(&self, address: &str, timeout: Duration) -> TreasuryResult<Vec<CatBalance>> {
        let url = format!("{}/address/token-balance/{}", self.base_url, address);
        let response: TokenBalanceResponse = self.client.get_json(&url, timeout).await?;
        info!("[SPACESCAN] {} CATs for {}", response.data.len(), tail(address));
        Ok(response.data)
    }

    pub async fn nft_balance(&self, address: &str, timeout: Duration) -> TreasuryResult<Vec<RawNft>> {
        let url = format!("{}/address/nft-balance/{}", self.base_url, address);
        let response: NftBalanceResponse = self.client.get_json(&url, timeout).await?;
        info!("[SPACESCAN] {} NFTs for {}", response.balance.len(), tail(address));
        Ok(response.balance)
    }

    /// Direct USD quote from the asset metadata endpoint; `None` unless positive.
    pub async fn cat_quote(&self, asset_id: &str, timeout: Duration) -> Option<PriceQuote> {
        let url = format!("{}/cat/info/{}", self.base_url, asset_id);
        let info = self.client.try_get_json::<CatInfoResponse>(&url, timeout).await?.data?;

        if info.amount_price <= 0.0 {
            debug!("[SPACESCAN] no price for {}", asset_id);
            return None;
        }

        Some(PriceQuote {
            price: info.amount_price,
            change: info.pricepercentage,
            market_cap: info.circulating_supply * info.amount_price,
            source: PriceSource::Spacescan,
        })
    }

    pub async fn address_proxy(&self, endpoint: AddressEndpoint, address: &str) -> TreasuryResult<Value> {
        let url = format!(
            "{}/address/{}/{}",
            self.base_url,
            endpoint,
            urlencoding::encode(address)
        );
        self.client.get_value(&url, endpoint.timeout()).await
    }

    /// Forwards an arbitrary path below the upstream root.
    pub async fn path_proxy(&self, path: &str) -> TreasuryResult<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client.get_value(&url, PATH_PROXY_TIMEOUT).await
    }
}

/// Last twelve characters of an address, enough to tell wallets apart in logs.
pub fn tail(address: &str) -> &str {
    let start = address.len().saturating_sub(12);
    address.get(start..).unwrap_or(address)
}
