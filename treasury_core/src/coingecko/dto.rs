use std::collections::HashMap;

use serde::Deserialize;

use crate::helpers::lenient;

/// `/simple/price?ids=chia&vs_currencies=usd` answers `{"chia": {"usd": 4.2}}`.
pub type SimplePriceResponse = HashMap<String, CoinQuote>;

#[derive(Debug, Clone, Deserialize)]
pub struct CoinQuote {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub usd: f64,
}
