use std::sync::Arc;

use axum::{Json, extract::State};
use treasury_core::merkl::{
    dto::{MerklPool, MerklProxyResponse},
    handler::fallback_pools,
};

use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/api/merkl-pools",
    description = "Top three rewarded pools by APR, or a fixed list when the upstream is down",
    responses(
        (status = 200, description = "Success", body = [MerklPool]),
    )
)]
pub async fn merkl_pools(State(server_state): State<Arc<ServerState>>) -> Json<Vec<MerklPool>> {
    let pools = server_state
        .providers()
        .merkl
        .top_pools()
        .await
        .unwrap_or_else(fallback_pools);
    Json(pools)
}

#[utoipa::path(
    get,
    path = "/api/merkl-proxy",
    description = "Top three rewarded pools with pair and chain name, empty when the upstream is down",
    responses(
        (status = 200, description = "Success", body = MerklProxyResponse),
    )
)]
pub async fn merkl_proxy(State(server_state): State<Arc<ServerState>>) -> Json<MerklProxyResponse> {
    let pools = server_state
        .providers()
        .merkl
        .top_pools()
        .await
        .unwrap_or_default();
    Json(MerklProxyResponse {
        pools: pools.into_iter().map(Into::into).collect(),
    })
}
