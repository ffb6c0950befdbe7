use std::{collections::HashMap, sync::Arc};

use axum::{Json, body::Bytes, extract::State};

use crate::{
    collections::dto::{CollectionsRequest, CollectionsResponse},
    error::ErrorServer,
    state::ServerState,
};

#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CollectionsRequest,
    description = "Collection name, thumbnail and floor for up to 60 ids",
    responses(
        (status = 200, description = "Success", body = CollectionsResponse),
        (status = 400, description = "bad body"),
    )
)]
pub async fn collections(
    State(server_state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<CollectionsResponse>, ErrorServer> {
    let request: CollectionsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CollectionsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| ErrorServer::bad_request("bad body").not_ok())?
    };

    if request.col_ids.is_empty() {
        return Ok(Json(CollectionsResponse {
            ok: true,
            collections: HashMap::new(),
        }));
    }

    let collections = server_state
        .providers()
        .mintgarden
        .lookup_many(&request.col_ids)
        .await;

    Ok(Json(CollectionsResponse { ok: true, collections }))
}
