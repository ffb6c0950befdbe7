use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::helpers::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct XchBalanceResponse {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub xch: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalanceResponse {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub data: Vec<CatBalance>,
}

/// One CAT row of `/address/token-balance/{address}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatBalance {
    #[serde(default, deserialize_with = "lenient::string")]
    pub asset_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub balance: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price_xch: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total_value: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub preview_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftBalanceResponse {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub balance: Vec<RawNft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNft {
    #[serde(default, deserialize_with = "lenient::string")]
    pub nft_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub collection_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub preview_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatInfoResponse {
    pub data: Option<CatInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatInfo {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount_price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub pricepercentage: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub circulating_supply: f64,
}

/// Address endpoints the browser is allowed to reach through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressEndpoint {
    Balance,
    NftBalance,
    TokenBalance,
}

impl AddressEndpoint {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "balance" => Some(AddressEndpoint::Balance),
            "nft-balance" => Some(AddressEndpoint::NftBalance),
            "token-balance" => Some(AddressEndpoint::TokenBalance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressEndpoint::Balance => "balance",
            AddressEndpoint::NftBalance => "nft-balance",
            AddressEndpoint::TokenBalance => "token-balance",
        }
    }

    /// Token balances of large wallets take far longer to assemble upstream.
    pub fn timeout(&self) -> Duration {
        match self {
            AddressEndpoint::TokenBalance => Duration::from_secs(30),
            _ => Duration::from_secs(12),
        }
    }
}

impl fmt::Display for AddressEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
