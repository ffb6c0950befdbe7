use serde::Deserialize;
use serde_json::Value;

use crate::helpers::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct AddressResponse {
    /// Native balance in wei, as a decimal string.
    #[serde(default, deserialize_with = "lenient::f64")]
    pub coin_balance: f64,
}

/// The explorer answers either a bare array or a paginated `{items}` envelope.
pub fn token_balance_items(body: Value) -> Vec<TokenBalanceItem> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut page) => match page.remove("items") {
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

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenBalanceItem {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub value: f64,
    #[serde(default)]
    pub token: TokenMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMeta {
    #[serde(default, deserialize_with = "lenient::string")]
    pub address_hash: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub decimals: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub exchange_rate: f64,
}

impl TokenBalanceItem {
    /// Missing or zero decimals are read as 18.
    pub fn decimals(&self) -> u32 {
        match self.token.decimals.trim().parse::<u32>() {
            Ok(0) | Err(_) => 18,
            Ok(decimals) => decimals,
        }
    }

    pub fn balance(&self) -> f64 {
        self.value / 10f64.powi(self.decimals() as i32)
    }

    pub fn contract(&self) -> String {
        let address = if self.token.address_hash.is_empty() {
            &self.token.address
        } else {
            &self.token.address_hash
        };
        address.to_lowercase()
    }
}
