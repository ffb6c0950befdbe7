use serde::Deserialize;

use crate::helpers::lenient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickersResponse {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub tickers: Vec<Ticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    #[serde(default, deserialize_with = "lenient::string")]
    pub base_id: String,
    /// Last trade, quoted in XCH.
    #[serde(default, deserialize_with = "lenient::f64")]
    pub last_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OffersResponse {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Offer {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
}
