use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::helpers::dto::{PriceQuote, PriceSource};
use crate::spacescan::dto::{CatBalance, RawNft};

/// Price board for the tracked CAT assets, keyed by asset id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketBoard {
    pub prices: BTreeMap<String, f64>,
    pub changes: BTreeMap<String, f64>,
    pub mcaps: BTreeMap<String, f64>,
    pub xch_usd: f64,
    pub sources: BTreeMap<String, PriceSource>,
}

impl MarketBoard {
    pub fn new(xch_usd: f64) -> Self {
        Self {
            xch_usd,
            ..Default::default()
        }
    }

    pub fn insert(&mut self, asset_id: &str, quote: PriceQuote) {
        self.prices.insert(asset_id.to_string(), quote.price);
        self.changes.insert(asset_id.to_string(), quote.change);
        self.mcaps.insert(asset_id.to_string(), quote.market_cap);
        self.sources.insert(asset_id.to_string(), quote.source);
    }

    pub fn priced(&self) -> usize {
        self.prices.values().filter(|p| **p > 0.0).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletToken {
    pub asset_id: String,
    pub name: String,
    pub symbol: String,
    pub balance: f64,
    pub price: f64,
    pub total_value: f64,
}

impl From<CatBalance> for WalletToken {
    fn from(cat: CatBalance) -> Self {
        let name = if cat.name.is_empty() { cat.symbol.clone() } else { cat.name.clone() };
        let symbol = if cat.symbol.is_empty() { cat.name } else { cat.symbol };
        Self {
            asset_id: cat.asset_id,
            name,
            symbol,
            balance: cat.balance,
            price: cat.price,
            total_value: cat.total_value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub wallet: String,
    pub xch_bal: f64,
    pub nfts: Vec<RawNft>,
    pub tokens: Vec<WalletToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreasuryWallets {
    pub ok: bool,
    pub wallets: Vec<WalletSnapshot>,
    pub elapsed_ms: u64,
}
