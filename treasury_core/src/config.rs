use std::{env, time::Duration};

use log::info;

use crate::error::{TreasuryError, TreasuryResult};
use crate::helpers::{defaults, rate_limit::RateLimits, retry::RetryPolicy};

/// Upstream roots, overridable so tests can point every provider at a mock server.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamUrls {
    pub coingecko: String,
    pub spacescan: String,
    pub xchscan: String,
    pub dexie: String,
    pub mintgarden: String,
    pub blockscout: String,
    pub dexscreener: String,
    pub merkl: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            coingecko: "https://api.coingecko.com/api/v3".to_string(),
            spacescan: "https://api.spacescan.io".to_string(),
            xchscan: "https://xchscan.com/api".to_string(),
            dexie: "https://dexie.space".to_string(),
            mintgarden: "https://api.mintgarden.io".to_string(),
            blockscout: "https://base.blockscout.com".to_string(),
            dexscreener: "https://api.dexscreener.com".to_string(),
            merkl: "https://api.merkl.xyz".to_string(),
        }
    }
}

impl UpstreamUrls {
    /// Every provider rooted at the same host, as used by tests.
    pub fn all(root: &str) -> Self {
        Self {
            coingecko: root.to_string(),
            spacescan: root.to_string(),
            xchscan: root.to_string(),
            dexie: root.to_string(),
            mintgarden: root.to_string(),
            blockscout: root.to_string(),
            dexscreener: root.to_string(),
            merkl: root.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPrices {
    pub xch_usd: f64,
    pub eth_usd: f64,
}

impl Default for FallbackPrices {
    fn default() -> Self {
        Self {
            xch_usd: defaults::DEFAULT_XCH_USD,
            eth_usd: defaults::DEFAULT_ETH_USD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KvConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Retries {
    /// CAT balances of each wallet in full mode.
    pub full_cat: RetryPolicy,
    /// CAT balances of a single wallet.
    pub single_cat: RetryPolicy,
    pub nfts: RetryPolicy,
}

impl Default for Retries {
    fn default() -> Self {
        Self {
            full_cat: RetryPolicy::new(
                vec![Duration::ZERO, Duration::from_secs(8), Duration::from_secs(16)],
                Duration::from_secs(23),
            ),
            single_cat: RetryPolicy::single(Duration::from_secs(25)),
            nfts: RetryPolicy::new(vec![Duration::ZERO, Duration::from_secs(4)], Duration::from_secs(20)),
        }
    }
}

impl Retries {
    pub fn within_budget(&self, budget: Duration) -> Self {
        Self {
            full_cat: self.full_cat.within_budget(budget),
            single_cat: self.single_cat.within_budget(budget),
            nfts: self.nfts.within_budget(budget),
        }
    }
}

/// Hard wall-clock limit the hosting platform puts on one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionCeiling {
    pub ceiling: Duration,
    pub margin: Duration,
}

impl Default for ExecutionCeiling {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(60),
            margin: Duration::from_secs(2),
        }
    }
}

impl ExecutionCeiling {
    pub fn budget(&self) -> Duration {
        self.ceiling.saturating_sub(self.margin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server_domain: String,
    pub upstreams: UpstreamUrls,
    pub base_rpc_urls: Vec<String>,
    pub kv: Option<KvConfig>,
    pub save_db_path: Option<String>,
    pub fallback_prices: FallbackPrices,
    pub market_cat_ids: Vec<String>,
    pub retries: Retries,
    pub rate_limits: RateLimits,
    pub ceiling: ExecutionCeiling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_domain: "0.0.0.0:3000".to_string(),
            upstreams: UpstreamUrls::default(),
            base_rpc_urls: defaults::BASE_RPC_URLS.iter().map(|u| u.to_string()).collect(),
            kv: None,
            save_db_path: None,
            fallback_prices: FallbackPrices::default(),
            market_cat_ids: defaults::MARKET_CAT_IDS.iter().map(|id| id.to_string()).collect(),
            retries: Retries::default(),
            rate_limits: RateLimits::default(),
            ceiling: ExecutionCeiling::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> TreasuryResult<Self> {
        let defaults = Config::default();
        let upstream = defaults.upstreams;

        let upstreams = UpstreamUrls {
            coingecko: env_url("COINGECKO_URL", upstream.coingecko),
            spacescan: env_url("SPACESCAN_URL", upstream.spacescan),
            xchscan: env_url("XCHSCAN_URL", upstream.xchscan),
            dexie: env_url("DEXIE_URL", upstream.dexie),
            mintgarden: env_url("MINTGARDEN_URL", upstream.mintgarden),
            blockscout: env_url("BLOCKSCOUT_URL", upstream.blockscout),
            dexscreener: env_url("DEXSCREENER_URL", upstream.dexscreener),
            merkl: env_url("MERKL_URL", upstream.merkl),
        };

        let kv = match (env_value("KV_REST_API_URL"), env_value("KV_REST_API_TOKEN")) {
            (Some(url), Some(token)) => Some(KvConfig {
                url: url.trim_end_matches('/').to_string(),
                token,
            }),
            _ => None,
        };

        let fallback_prices = FallbackPrices {
            xch_usd: env_f64("DEFAULT_XCH_USD", defaults.fallback_prices.xch_usd)?,
            eth_usd: env_f64("DEFAULT_ETH_USD", defaults.fallback_prices.eth_usd)?,
        };

        let ceiling = ExecutionCeiling {
            ceiling: Duration::from_secs(env_u64("EXECUTION_CEILING_SECS", defaults.ceiling.ceiling.as_secs())?),
            margin: Duration::from_secs(env_u64("EXECUTION_MARGIN_SECS", defaults.ceiling.margin.as_secs())?),
        };

        let config = Self {
            server_domain: env_value("SERVER_DOMAIN").unwrap_or(defaults.server_domain),
            upstreams,
            base_rpc_urls: env_list("BASE_RPC_URLS").unwrap_or(defaults.base_rpc_urls),
            kv,
            save_db_path: env_value("SAVE_DB_PATH"),
            fallback_prices,
            market_cat_ids: env_list("MARKET_CAT_IDS").unwrap_or(defaults.market_cat_ids),
            retries: defaults.retries.within_budget(ceiling.budget()),
            rate_limits: defaults.rate_limits,
            ceiling,
        };

        info!(
            "Config loaded: {} RPC endpoints, {} market assets, budget {}s",
            config.base_rpc_urls.len(),
            config.market_cat_ids.len(),
            config.ceiling.budget().as_secs()
        );

        Ok(config)
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_url(key: &str, default: String) -> String {
    env_value(key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let list: Vec<String> = env_value(key)?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if list.is_empty() { None } else { Some(list) }
}

fn env_f64(key: &str, default: f64) -> TreasuryResult<f64> {
    match env_value(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| TreasuryError::Config(format!("{} must be a positive number, got {:?}", key, raw))),
    }
}

fn env_u64(key: &str, default: u64) -> TreasuryResult<u64> {
    match env_value(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| TreasuryError::Config(format!("{} must be a whole number of seconds, got {:?}", key, raw))),
    }
}
