use serde::Deserialize;
use serde_json::Value;

use crate::helpers::lenient;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(default, deserialize_with = "lenient::string")]
    pub chain_id: String,
    #[serde(default)]
    pub base_token: PairToken,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price_usd: f64,
    #[serde(default)]
    pub liquidity: Liquidity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairToken {
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub usd: f64,
}

/// Best quote found for one token.
#[derive(Debug, Clone, PartialEq)]
pub struct DexQuote {
    pub price: f64,
    pub liquidity: f64,
    pub symbol: String,
}

/// The v1 endpoint answers a bare array, the legacy one `{pairs}`.
pub fn pairs_from_value(body: Value) -> Vec<Pair> {
    let pairs = match body {
        Value::Array(pairs) => pairs,
        Value::Object(mut envelope) => match envelope.remove("pairs") {
            Some(Value::Array(pairs)) => pairs,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    pairs
        .into_iter()
        .filter_map(|pair| serde_json::from_value(pair).ok())
        .collect()
}
