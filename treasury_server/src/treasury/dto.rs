use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TreasuryQuery {
    /// `base` or `chia`.
    pub chain: Option<String>,
    /// `tokens` (default), `nfts` or `full`; Chia only.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub address: Option<String>,
    /// Full mode: first wallet, `address` is accepted instead.
    pub address1: Option<String>,
    /// Full mode: optional second wallet.
    pub address2: Option<String>,
}
