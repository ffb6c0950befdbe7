use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::helpers::lenient;

pub const POOLS_URL: &str = "https://app.merkl.xyz/?search=ninemm&sort=apr-desc&test=true";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Opportunity {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub identifier: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub apr: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub tvl: f64,
}

/// Reward pool card shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MerklPool {
    pub name: String,
    pub symbol: String,
    pub apr: f64,
    pub tvl: f64,
    pub url: String,
}

impl MerklPool {
    pub fn new(name: &str, apr: f64, tvl: f64) -> Self {
        Self {
            name: name.to_string(),
            symbol: name.to_string(),
            apr,
            tvl,
            url: POOLS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MerklProxyPool {
    pub name: String,
    pub symbol: String,
    pub pair: String,
    pub apr: f64,
    pub tvl: f64,
    pub chain_name: String,
    pub url: String,
}

impl From<MerklPool> for MerklProxyPool {
    fn from(pool: MerklPool) -> Self {
        Self {
            pair: pool.name.clone(),
            name: pool.name,
            symbol: pool.symbol,
            apr: pool.apr,
            tvl: pool.tvl,
            chain_name: "Base".to_string(),
            url: pool.url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MerklProxyResponse {
    pub pools: Vec<MerklProxyPool>,
}
