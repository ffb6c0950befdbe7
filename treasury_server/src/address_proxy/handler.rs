use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use log::warn;
use serde_json::Value;
use treasury_core::spacescan::{dto::AddressEndpoint, handler::tail};

use crate::{
    address_proxy::dto::AddressProxyRequest, error::ErrorServer, state::ServerState, util::present,
};

async fn forward(server_state: &ServerState, request: AddressProxyRequest) -> Result<Json<Value>, ErrorServer> {
    let (Some(endpoint), Some(address)) = (present(&request.endpoint), present(&request.address)) else {
        return Err(ErrorServer::bad_request("Missing endpoint or address"));
    };
    let endpoint = AddressEndpoint::parse(endpoint).ok_or_else(|| ErrorServer::bad_request("Invalid endpoint"))?;

    let data = server_state
        .providers()
        .spacescan
        .address_proxy(endpoint, address)
        .await
        .map_err(|e| {
            warn!("[ADDRESS-PROXY] {} {}: {}", endpoint, tail(address), e);
            ErrorServer::from(e)
        })?;

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/address-proxy",
    params(AddressProxyRequest),
    description = "Forward an address lookup to the Chia explorer",
    responses(
        (status = 200, description = "Upstream body"),
        (status = 400, description = "Missing or invalid endpoint or address"),
        (status = 500, description = "Upstream failure"),
    )
)]
pub async fn address_proxy_get(
    State(server_state): State<Arc<ServerState>>,
    Query(request): Query<AddressProxyRequest>,
) -> Result<Json<Value>, ErrorServer> {
    forward(&server_state, request).await
}

#[utoipa::path(
    post,
    path = "/api/address-proxy",
    request_body = AddressProxyRequest,
    description = "Forward an address lookup to the Chia explorer",
    responses(
        (status = 200, description = "Upstream body"),
        (status = 400, description = "Missing or invalid endpoint or address"),
        (status = 500, description = "Upstream failure"),
    )
)]
pub async fn address_proxy_post(
    State(server_state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<Value>, ErrorServer> {
    let request: AddressProxyRequest = serde_json::from_slice(&body).unwrap_or_default();
    forward(&server_state, request).await
}
