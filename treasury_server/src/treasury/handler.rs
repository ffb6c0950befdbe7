use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use treasury_core::{
    base::handler::fetch_base,
    chia::handler::{chia_full, chia_nfts, chia_tokens},
};

use crate::{
    error::ErrorServer,
    state::ServerState,
    treasury::dto::TreasuryQuery,
    util::{present, with_error},
};

#[utoipa::path(
    get,
    path = "/api/treasury",
    params(TreasuryQuery),
    description = "Holdings of a Base wallet, or tokens / NFTs / both of Chia wallets. Upstream trouble is reported in `error` with status 200.",
    responses(
        (status = 200, description = "Holdings, possibly partial"),
        (status = 400, description = "Missing or invalid chain, type or address"),
    )
)]
pub async fn treasury(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<TreasuryQuery>,
) -> Result<Response, ErrorServer> {
    let providers = server_state.providers();
    let chain = present(&query.chain);
    let kind = present(&query.kind);

    if chain == Some("chia") && kind == Some("full") {
        let address1 = present(&query.address1)
            .or_else(|| present(&query.address))
            .ok_or_else(|| ErrorServer::bad_request("Missing address1"))?;
        let outcome = chia_full(providers, address1, present(&query.address2)).await;
        return Ok(Json(with_error(outcome)).into_response());
    }

    let chain = chain.ok_or_else(|| ErrorServer::bad_request("Missing chain"))?;
    let address = || present(&query.address).ok_or_else(|| ErrorServer::bad_request("Missing address"));

    match (chain, kind.unwrap_or("tokens")) {
        ("base", _) => {
            let outcome = fetch_base(providers, address()?).await;
            Ok(Json(with_error(outcome)).into_response())
        }
        ("chia", "tokens") => {
            let outcome = chia_tokens(providers, address()?).await;
            Ok(Json(with_error(outcome)).into_response())
        }
        ("chia", "nfts") => {
            let outcome = chia_nfts(providers, address()?).await;
            Ok(Json(with_error(outcome)).into_response())
        }
        _ => Err(ErrorServer::bad_request("Invalid chain/type")),
    }
}
