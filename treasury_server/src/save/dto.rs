use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuery {
    pub device_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreSaveRequest {
    /// Used when the query string carries no device id.
    pub device_id: Option<String>,
    pub save: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct LoadSaveResponse {
    pub ok: bool,
    pub save: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct StoreSaveResponse {
    pub ok: bool,
}
