use std::{collections::HashMap, time::Duration};

use crate::dexie::dto::{OffersResponse, TickersResponse};
use crate::helpers::{
    dto::{PriceQuote, PriceSource},
    fetch::UpstreamClient,
};

pub const TICKERS_TIMEOUT: Duration = Duration::from_secs(8);
pub const OFFERS_TIMEOUT: Duration = Duration::from_secs(7);

/// Last traded price per asset, keyed by lowercased asset id, in XCH.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerBook {
    last_xch: HashMap<String, f64>,
}

impl TickerBook {
    pub fn from_response(response: TickersResponse) -> Self {
        let last_xch = response
            .tickers
            .into_iter()
            .filter(|t| !t.base_id.is_empty() && t.last_price > 0.0)
            .map(|t| (t.base_id.to_lowercase(), t.last_price))
            .collect();
        Self { last_xch }
    }

    pub fn usd_quote(&self, asset_id: &str, xch_usd: f64) -> Option<PriceQuote> {
        let last = self.last_xch.get(&asset_id.to_lowercase())?;
        let price = last * xch_usd;
        (price > 0.0).then(|| PriceQuote {
            price,
            change: 0.0,
            market_cap: 0.0,
            source: PriceSource::Dexie,
        })
    }

    pub fn len(&self) -> usize {
        self.last_xch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_xch.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Dexie {
    client: UpstreamClient,
    base_url: String,
}

impl Dexie {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Aggregated ticker list; an unreachable exchange yields an empty book.
    pub async fn tickers(&self) -> TickerBook {
        let url = format!("{}/v2/prices/tickers", self.base_url);
        self.client
            .try_get_json::<TickersResponse>(&url, TICKERS_TIMEOUT)
            .await
            .map(TickerBook::from_response)
            .unwrap_or_default()
    }

    /// Lowest open ask selling `asset_id` for XCH, converted to USD.
    pub async fn best_ask(&self, asset_id: &str, xch_usd: f64) -> Option<PriceQuote> {
        let url = format!(
            "{}/v1/offers?offered={}&requested=xch&page=1&page_size=5&sort=price&order=asc",
            self.base_url,
            urlencoding::encode(asset_id)
        );
        let response = self.client.try_get_json::<OffersResponse>(&url, OFFERS_TIMEOUT).await?;

        let lowest = response
            .offers
            .iter()
            .map(|o| o.price)
            .filter(|p| *p > 0.0)
            .fold(None, |min: Option<f64>, p| Some(min.map_or(p, |m| m.min(p))))?;

        Some(PriceQuote {
            price: lowest * xch_usd,
            change: 0.0,
            market_cap: 0.0,
            source: PriceSource::Dexie,
        })
    }
}
