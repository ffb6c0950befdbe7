use serde::{Deserialize, Serialize};
use treasury_core::market::dto::MarketBoard;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct MarketQuery {
    /// `treasury` switches to per-wallet balances.
    pub mode: Option<String>,
    /// Comma separated wallet addresses, treasury mode only.
    pub wallets: Option<String>,
}

impl MarketQuery {
    pub fn treasury_wallets(&self) -> Option<Vec<String>> {
        if self.mode.as_deref() != Some("treasury") {
            return None;
        }
        let wallets: Vec<String> = self
            .wallets
            .as_deref()?
            .split(',')
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if wallets.is_empty() { None } else { Some(wallets) }
    }
}

#[derive(Debug, Serialize)]
pub struct MarketResponse {
    #[serde(flatten)]
    pub board: MarketBoard,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
