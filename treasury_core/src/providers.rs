use std::{sync::Arc, time::Duration};

use crate::blockscout::handler::Blockscout;
use crate::coingecko::handler::CoinGecko;
use crate::config::{Config, FallbackPrices, Retries};
use crate::dexie::handler::Dexie;
use crate::dexscreener::handler::DexScreener;
use crate::error::TreasuryResult;
use crate::helpers::{fetch::UpstreamClient, rate_limit::RateLimiter};
use crate::merkl::handler::Merkl;
use crate::mintgarden::handler::MintGarden;
use crate::rpc::handler::RpcClient;
use crate::spacescan::handler::Spacescan;
use crate::xchscan::handler::XchScan;

/// Every upstream client the aggregations need, built once from `Config` and
/// sharing one HTTP connection pool and one rate limiter.
pub struct Providers {
    pub coingecko: CoinGecko,
    pub spacescan: Spacescan,
    pub xchscan: XchScan,
    pub dexie: Dexie,
    pub mintgarden: MintGarden,
    pub blockscout: Blockscout,
    pub dexscreener: DexScreener,
    pub merkl: Merkl,
    pub rpc: RpcClient,
    pub limiter: Arc<RateLimiter>,
    pub fallback_prices: FallbackPrices,
    pub retries: Retries,
    /// Wall-clock allowance of one request: execution ceiling minus margin.
    pub budget: Duration,
    pub market_cat_ids: Vec<String>,
}

impl Providers {
    pub fn from_config(config: &Config) -> TreasuryResult<Self> {
        let client = UpstreamClient::new()?;
        let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
        let urls = &config.upstreams;

        Ok(Self {
            coingecko: CoinGecko::new(client.clone(), &urls.coingecko),
            spacescan: Spacescan::new(client.clone(), &urls.spacescan),
            xchscan: XchScan::new(client.clone(), &urls.xchscan),
            dexie: Dexie::new(client.clone(), &urls.dexie),
            mintgarden: MintGarden::new(client.clone(), &urls.mintgarden),
            blockscout: Blockscout::new(client.clone(), &urls.blockscout),
            dexscreener: DexScreener::new(client.clone(), &urls.dexscreener, limiter.clone()),
            merkl: Merkl::new(client.clone(), &urls.merkl),
            rpc: RpcClient::new(client, config.base_rpc_urls.clone(), limiter.clone()),
            limiter,
            fallback_prices: config.fallback_prices,
            retries: config.retries.clone(),
            budget: config.ceiling.budget(),
            market_cat_ids: config.market_cat_ids.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::UpstreamUrls;
    use crate::helpers::{rate_limit::RateLimits, retry::RetryPolicy};

    /// Providers pointed at one mock server, with pacing off and short retries.
    pub fn providers(root: &str) -> Providers {
        let config = Config {
            upstreams: UpstreamUrls::all(root),
            base_rpc_urls: vec![format!("{}/rpc", root)],
            rate_limits: RateLimits::unlimited(),
            retries: Retries {
                full_cat: RetryPolicy::new(
                    vec![Duration::ZERO, Duration::from_millis(50)],
                    Duration::from_secs(2),
                ),
                single_cat: RetryPolicy::single(Duration::from_secs(2)),
                nfts: RetryPolicy::new(vec![Duration::ZERO, Duration::from_millis(50)], Duration::from_secs(2)),
            },
            ..Config::default()
        };
        Providers::from_config(&config).unwrap()
    }
}
