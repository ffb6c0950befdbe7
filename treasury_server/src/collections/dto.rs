use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use treasury_core::mintgarden::dto::CollectionSummary;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionsRequest {
    /// Only the first 60 ids are looked up.
    #[serde(default)]
    pub col_ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionsResponse {
    pub ok: bool,
    pub collections: HashMap<String, CollectionSummary>,
}
