use std::{sync::LazyLock, time::Duration};

use log::{info, warn};
use regex::Regex;
use serde_json::Value;

use crate::error::TreasuryResult;
use crate::helpers::fetch::UpstreamClient;
use crate::merkl::dto::{MerklPool, Opportunity};

pub const TIMEOUT: Duration = Duration::from_secs(10);
pub const TOP_POOLS: usize = 3;

static LIQUIDITY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Provide liquidity to\s+").expect("Invalid prefix regex"));
static APR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+(\.\d+)?%\s*$").expect("Invalid APR regex"));
static NINEMM_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)NINEMM\s*").expect("Invalid tag regex"));

#[derive(Clone, Debug)]
pub struct Merkl {
    client: UpstreamClient,
    base_url: String,
}

impl Merkl {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn opportunities(&self) -> TreasuryResult<Vec<Opportunity>> {
        let url = format!("{}/v4/opportunities?search=9mm&test=true", self.base_url);
        let body = self.client.get_value(&url, TIMEOUT).await?;
        Ok(opportunities_from_value(body))
    }

    /// Best rewarded pools by APR. `None` when the upstream could not be read.
    pub async fn top_pools(&self) -> Option<Vec<MerklPool>> {
        match self.opportunities().await {
            Ok(opportunities) => {
                let pools = rank_pools(opportunities);
                info!("[MERKL] {} pools", pools.len());
                Some(pools)
            }
            Err(e) => {
                warn!("[MERKL] opportunities unavailable: {}", e);
                None
            }
        }
    }
}

fn opportunities_from_value(body: Value) -> Vec<Opportunity> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("items").or_else(|| envelope.remove("opportunities")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

pub fn rank_pools(opportunities: Vec<Opportunity>) -> Vec<MerklPool> {
    let mut pools: Vec<MerklPool> = opportunities
        .into_iter()
        .filter(|o| o.apr > 0.0 && o.tvl > 0.0)
        .map(|o| {
            let raw = if !o.name.is_empty() {
                o.name.as_str()
            } else if !o.identifier.is_empty() {
                o.identifier.as_str()
            } else {
                "Pool"
            };
            MerklPool::new(&display_name(raw), o.apr, o.tvl)
        })
        .collect();

    pools.sort_by(|a, b| b.apr.total_cmp(&a.apr));
    pools.truncate(TOP_POOLS);
    pools
}

/// "Provide liquidity to NINEMM WETH-SPROUT 1.2%" becomes "WETH / SPROUT".
pub fn display_name(raw: &str) -> String {
    let name = LIQUIDITY_PREFIX.replace(raw, "");
    let name = APR_SUFFIX.replace(&name, "");
    let name = NINEMM_TAG.replace(&name, "");
    let name = name.trim();

    let parts: Vec<&str> = name
        .split(['-', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() >= 2 {
        format!("{} / {}", parts[0], parts[1])
    } else {
        name.to_string()
    }
}

/// Shown when the rewards API is down so the landing page is never empty.
pub fn fallback_pools() -> Vec<MerklPool> {
    vec![
        MerklPool::new("WETH / SPROUT", 125.1, 2076.0),
        MerklPool::new("CASTER / SPROUT", 73.3, 3284.0),
        MerklPool::new("WETH / CBBTC", 64.2, 17167.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkl::dto::{MerklProxyPool, POOLS_URL};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_display_name_cleanup() {
        assert_eq!(display_name("Provide liquidity to NINEMM WETH-SPROUT 1.25%"), "WETH / SPROUT");
        assert_eq!(display_name("provide liquidity to CASTER/SPROUT"), "CASTER / SPROUT");
        assert_eq!(display_name("Staking"), "Staking");
    }

    #[test]
    fn test_name_cleanup_patterns() {
        assert!(LIQUIDITY_PREFIX.is_match("PROVIDE LIQUIDITY TO x"));
        assert!(APR_SUFFIX.is_match("A-B 12.5%"));
        assert!(!APR_SUFFIX.is_match("A-B 12.5% boost"));
        assert!(NINEMM_TAG.is_match("ninemm A-B"));
        assert_eq!(display_name("NINEMM cbBTC/WETH 3%"), "cbBTC / WETH");
    }

    #[tokio::test]
    async fn test_top_pools_sorted_and_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/opportunities"))
            .and(query_param("search", "9mm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Provide liquidity to NINEMM A-B 3%", "apr": 10, "tvl": 100},
                {"name": "Provide liquidity to NINEMM C-D", "apr": "90.5", "tvl": 50},
                {"name": "dead", "apr": 500, "tvl": 0},
                {"identifier": "E-F", "apr": 40, "tvl": 1},
                {"name": "G-H", "apr": 1, "tvl": 1}
            ])))
            .mount(&server)
            .await;

        let merkl = Merkl::new(UpstreamClient::new().unwrap(), &server.uri());
        let pools = merkl.top_pools().await.unwrap();

        let names: Vec<&str> = pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C / D", "E / F", "A / B"]);
        assert_eq!(pools[0].url, POOLS_URL);

        let proxied = MerklProxyPool::from(pools[0].clone());
        assert_eq!(proxied.pair, "C / D");
        assert_eq!(proxied.chain_name, "Base");
    }

    #[tokio::test]
    async fn test_envelope_shapes_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/opportunities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "opportunities": [{"name": "X-Y", "apr": 5, "tvl": 5}]
            })))
            .mount(&server)
            .await;

        let merkl = Merkl::new(UpstreamClient::new().unwrap(), &server.uri());
        assert_eq!(merkl.top_pools().await.unwrap().len(), 1);

        let down = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&down)
            .await;
        let merkl = Merkl::new(UpstreamClient::new().unwrap(), &down.uri());
        assert!(merkl.top_pools().await.is_none());
        assert_eq!(fallback_pools().len(), 3);
    }
}
