use serde::{Deserialize, Serialize};

/// Body of a KV REST `GET /get/{key}`. `result` holds the stored JSON text.
#[derive(Debug, Clone, Deserialize)]
pub struct KvGetResponse {
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KvSetRequest {
    pub value: String,
}
