use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AddressProxyRequest {
    /// One of `balance`, `nft-balance`, `token-balance`.
    pub endpoint: Option<String>,
    pub address: Option<String>,
}
