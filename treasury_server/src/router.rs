use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    address_proxy::handler::{address_proxy_get, address_proxy_post},
    collections::handler::collections,
    docs::{dto::ApiDoc, handler::api_docs},
    info::handler::info,
    market::handler::market_prices,
    merkl::handler::{merkl_pools, merkl_proxy},
    middlewares::handler::{common_headers, cors, edge_cache},
    save::handler::{load_save, method_not_allowed, store_save},
    spacescan_proxy::handler::spacescan_proxy,
    state::ServerState,
    treasury::handler::treasury,
};

pub fn router(state: ServerState) -> Router {
    let state = Arc::new(state);
    let doc = ApiDoc::openapi();

    let aggregates = Router::new()
        .route("/api/market-prices", get(market_prices))
        .route("/api/treasury", get(treasury))
        .route("/api/merkl-pools", get(merkl_pools))
        .route("/api/merkl-proxy", get(merkl_proxy))
        .route_layer(middleware::from_fn(edge_cache));

    Router::new()
        .merge(Redoc::with_url("/redoc", doc))
        .merge(aggregates)
        .route(
            "/api/save",
            get(load_save).post(store_save).fallback(method_not_allowed),
        )
        .route("/api/address-proxy", get(address_proxy_get).post(address_proxy_post))
        .route("/api/collections", post(collections))
        .route("/api/spacescan-proxy", get(spacescan_proxy))
        .route("/", get(info))
        .route("/docs", get(api_docs))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors())
                .layer(middleware::from_fn(common_headers)),
        )
        .with_state(state)
}
