use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use log::warn;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::ErrorServer, middlewares::handler::PROXY_CACHE, state::ServerState, util::present};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PathQuery {
    /// Path below the explorer root, e.g. `cat/info/{asset_id}`.
    pub path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/spacescan-proxy",
    params(PathQuery),
    description = "Forward any explorer path; upstream failure statuses are passed through",
    responses(
        (status = 200, description = "Upstream body"),
        (status = 400, description = "Missing path parameter"),
    )
)]
pub async fn spacescan_proxy(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ErrorServer> {
    let path = present(&query.path).ok_or_else(|| ErrorServer::bad_request("Missing path parameter"))?;

    match server_state.providers().spacescan.path_proxy(path).await {
        Ok(data) => Ok(([(CACHE_CONTROL, PROXY_CACHE)], Json(data)).into_response()),
        Err(e) => {
            warn!("[SPACESCAN-PROXY] {}: {}", path, e);
            Err(match e.upstream_status() {
                Some(status) => ErrorServer::new(
                    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                    format!("Spacescan returned {}", status.as_u16()),
                ),
                None => ErrorServer::from(e),
            })
        }
    }
}
