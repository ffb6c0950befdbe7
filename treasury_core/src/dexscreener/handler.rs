use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{info, warn};

use crate::dexscreener::dto::{pairs_from_value, DexQuote, Pair};
use crate::helpers::{
    fetch::UpstreamClient,
    rate_limit::{Lane, RateLimiter},
};

pub const BATCH_SIZE: usize = 20;
pub const TIMEOUT: Duration = Duration::from_secs(10);

const CHAIN: &str = "base";

#[derive(Clone, Debug)]
pub struct DexScreener {
    client: UpstreamClient,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl DexScreener {
    pub fn new(client: UpstreamClient, base_url: &str, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            limiter,
        }
    }

    /// USD prices for Base token addresses, keyed by lowercased address. When
    /// several pairs quote the same token the most liquid one wins.
    pub async fn prices(&self, addresses: &[String]) -> HashMap<String, DexQuote> {
        let mut unique: Vec<String> = Vec::new();
        for address in addresses {
            let address = address.to_lowercase();
            if !address.is_empty() && !unique.contains(&address) {
                unique.push(address);
            }
        }

        let mut quotes = HashMap::new();
        for batch in unique.chunks(BATCH_SIZE) {
            self.limiter.acquire(Lane::DexScreener).await;
            let pairs = self.batch_pairs(&batch.join(",")).await;
            merge_pairs(&mut quotes, pairs);
        }

        info!("[DEXSCREENER] priced {} of {} tokens", quotes.len(), unique.len());
        quotes
    }

    async fn batch_pairs(&self, csv: &str) -> Vec<Pair> {
        let v1 = format!("{}/tokens/v1/{}/{}", self.base_url, CHAIN, csv);
        let pairs = match self.client.get_value(&v1, TIMEOUT).await {
            Ok(body) => pairs_from_value(body),
            Err(e) => {
                warn!("[DEXSCREENER] v1 failed: {}", e);
                Vec::new()
            }
        };
        if !pairs.is_empty() {
            return pairs;
        }

        let legacy = format!("{}/latest/dex/tokens/{}", self.base_url, csv);
        match self.client.get_value(&legacy, TIMEOUT).await {
            Ok(body) => pairs_from_value(body),
            Err(e) => {
                warn!("[DEXSCREENER] legacy failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn merge_pairs(quotes: &mut HashMap<String, DexQuote>, pairs: Vec<Pair>) {
    for pair in pairs {
        if !pair.chain_id.is_empty() && pair.chain_id != CHAIN {
            continue;
        }
        let address = pair.base_token.address.to_lowercase();
        if address.is_empty() || pair.price_usd <= 0.0 {
            continue;
        }

        let better = quotes
            .get(&address)
            .map_or(true, |current| pair.liquidity.usd > current.liquidity);
        if better {
            quotes.insert(
                address,
                DexQuote {
                    price: pair.price_usd,
                    liquidity: pair.liquidity.usd,
                    symbol: pair.base_token.symbol,
                },
            );
        }
    }
}
