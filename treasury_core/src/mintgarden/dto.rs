use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::helpers::lenient;

/// `/collections/{id}` as returned upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionResponse {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail_uri: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub floor_price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub nft_count: f64,
}

/// Collection card served to the browser by the batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    pub floor_xch: f64,
    pub nft_count: u64,
}

impl CollectionSummary {
    /// Rows without an id or a name are not worth showing.
    pub fn from_response(response: CollectionResponse) -> Option<Self> {
        if response.id.is_empty() || response.name.is_empty() {
            return None;
        }
        Some(Self {
            id: response.id,
            name: response.name,
            thumbnail: response.thumbnail_uri,
            floor_xch: response.floor_price,
            nft_count: response.nft_count.max(0.0) as u64,
        })
    }
}
