use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use log::warn;
use treasury_core::{
    helpers::dto::Outcome,
    market::{
        dto::MarketBoard,
        handler::{market_prices as fetch_market_prices, treasury_wallets},
    },
};

use crate::{
    market::dto::{MarketQuery, MarketResponse},
    state::ServerState,
};

#[utoipa::path(
    get,
    path = "/api/market-prices",
    params(MarketQuery),
    description = "Prices of the tracked CAT assets, or per-wallet balances in treasury mode. Always 200; check `success`.",
    responses(
        (status = 200, description = "Price board or wallet balances"),
    )
)]
pub async fn market_prices(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<MarketQuery>,
) -> Response {
    let providers = server_state.providers();

    if let Some(wallets) = query.treasury_wallets() {
        return Json(treasury_wallets(providers, &wallets).await).into_response();
    }

    let response = match fetch_market_prices(providers).await {
        Outcome::Complete(board) => MarketResponse {
            board,
            success: true,
            error: None,
            warnings: Vec::new(),
        },
        Outcome::Partial { data, warnings } => MarketResponse {
            board: data,
            success: true,
            error: None,
            warnings,
        },
        Outcome::Failed { error } => {
            warn!("[MARKET] {}", error);
            MarketResponse {
                board: MarketBoard::new(providers.fallback_prices.xch_usd),
                success: false,
                error: Some(error),
                warnings: Vec::new(),
            }
        }
    };

    Json(response).into_response()
}
