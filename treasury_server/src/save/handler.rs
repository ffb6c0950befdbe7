use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use log::{error, info};
use serde_json::Value;
use treasury_core::storage::handler::stamp_now;

use crate::{
    error::ErrorServer,
    save::dto::{LoadSaveResponse, SaveQuery, StoreSaveRequest, StoreSaveResponse},
    state::ServerState,
    util::present,
};

fn missing_device() -> ErrorServer {
    ErrorServer::bad_request("Missing deviceId").not_ok()
}

fn storage_failure(e: impl std::fmt::Display) -> ErrorServer {
    error!("[SAVE] {}", e);
    ErrorServer::internal(e.to_string()).not_ok()
}

#[utoipa::path(
    get,
    path = "/api/save",
    params(SaveQuery),
    description = "Load the save of a device",
    responses(
        (status = 200, description = "Success, `save` is null when nothing was stored"),
        (status = 400, description = "Missing deviceId"),
        (status = 500, description = "Save store unavailable"),
    )
)]
pub async fn load_save(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<SaveQuery>,
) -> Result<Json<LoadSaveResponse>, ErrorServer> {
    let device_id = present(&query.device_id).ok_or_else(missing_device)?;

    let save = server_state
        .save_store()
        .load(device_id)
        .await
        .map_err(storage_failure)?;

    Ok(Json(LoadSaveResponse { ok: true, save }))
}

#[utoipa::path(
    post,
    path = "/api/save",
    params(SaveQuery),
    request_body = StoreSaveRequest,
    description = "Store the save of a device, stamping `savedAt` when absent",
    responses(
        (status = 200, description = "Success"),
        (status = 400, description = "Missing deviceId or save payload"),
        (status = 500, description = "Save store unavailable"),
    )
)]
pub async fn store_save(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<SaveQuery>,
    body: Bytes,
) -> Result<Json<StoreSaveResponse>, ErrorServer> {
    let request: StoreSaveRequest = serde_json::from_slice(&body).unwrap_or_default();

    let device_id = present(&query.device_id)
        .or_else(|| present(&request.device_id))
        .ok_or_else(missing_device)?;

    let mut save = match request.save {
        Some(save @ Value::Object(_)) => save,
        _ => return Err(ErrorServer::bad_request("Missing save payload").not_ok()),
    };
    stamp_now(&mut save);

    server_state
        .save_store()
        .store(device_id, &save)
        .await
        .map_err(storage_failure)?;

    info!("[SAVE] {} saved", device_id);
    Ok(Json(StoreSaveResponse { ok: true }))
}

pub async fn method_not_allowed() -> ErrorServer {
    ErrorServer::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").not_ok()
}
