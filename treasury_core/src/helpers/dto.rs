use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Native,
    Erc20,
    Cat,
    Lp,
}

/// Pool breakdown attached to `lp` holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpDetails {
    pub pair_name: String,
    pub token0: Option<String>,
    pub token1: Option<String>,
    pub price0: f64,
    pub price1: f64,
    pub total_liq_usd: f64,
    pub user_share_pct: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    pub balance: f64,
    pub price: f64,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_xch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub lp: Option<LpDetails>,
}

impl TokenHolding {
    /// A holding whose value is `balance * price`.
    pub fn priced(symbol: &str, name: &str, balance: f64, price: f64, kind: TokenKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            asset_id: None,
            contract: None,
            balance,
            price,
            value: balance * price,
            kind,
            price_xch: None,
            image: None,
            lp: None,
        }
    }

    /// Natural key used when merging the same asset held by several wallets.
    pub fn merge_key(&self) -> &str {
        match &self.asset_id {
            Some(id) if !id.is_empty() => id,
            _ => &self.symbol,
        }
    }
}

/// First item of a collection, shown as its preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftSample {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftCollection {
    pub id: String,
    pub name: String,
    pub count: u32,
    pub image: String,
    pub nfts: Vec<NftSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Spacescan,
    Dexie,
    Coingecko,
    Blockscout,
    Dexscreener,
    Fallback,
    None,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Spacescan => write!(f, "spacescan"),
            PriceSource::Dexie => write!(f, "dexie"),
            PriceSource::Coingecko => write!(f, "coingecko"),
            PriceSource::Blockscout => write!(f, "blockscout"),
            PriceSource::Dexscreener => write!(f, "dexscreener"),
            PriceSource::Fallback => write!(f, "fallback"),
            PriceSource::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: f64,
    pub change: f64,
    pub market_cap: f64,
    pub source: PriceSource,
}

impl PriceQuote {
    pub fn missing() -> Self {
        Self {
            price: 0.0,
            change: 0.0,
            market_cap: 0.0,
            source: PriceSource::None,
        }
    }
}

/// Result of an aggregation before it reaches the wire. Handlers always answer
/// 200; the variant decides whether an `error` or `success` field is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Partial { data: T, warnings: Vec<String> },
    Failed { error: String },
}

impl<T> Outcome<T> {
    pub fn from_parts(data: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Outcome::Complete(data)
        } else {
            Outcome::Partial { data, warnings }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Complete(data) | Outcome::Partial { data, .. } => Some(data),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokensReport {
    pub tokens: Vec<TokenHolding>,
    pub total: f64,
}

impl TokensReport {
    pub fn new(tokens: Vec<TokenHolding>) -> Self {
        let total = tokens.iter().map(|t| t.value).sum();
        Self { tokens, total }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftReport {
    pub nfts: Vec<NftCollection>,
    pub nft_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    pub tokens: Vec<TokenHolding>,
    pub total: f64,
    pub nfts: Vec<NftCollection>,
    pub nft_count: usize,
}
