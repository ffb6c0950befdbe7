use axum::{
    extract::Request,
    http::{
        HeaderValue, Method, StatusCode,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};

pub const AGGREGATE_CACHE: &str = "s-maxage=60, stale-while-revalidate=300";
pub const PROXY_CACHE: &str = "s-maxage=120, stale-while-revalidate=60";

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
}

/// Bare `OPTIONS` answers 200 without reaching a handler, and every response
/// names `Content-Type` as an allowed header.
pub async fn common_headers(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    response
        .headers_mut()
        .entry(ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static("Content-Type"));
    response
}

/// Lets the edge serve aggregation results for a minute and stale ones for
/// five more. A handler that already chose a policy keeps it.
pub async fn edge_cache(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .entry(CACHE_CONTROL)
        .or_insert(HeaderValue::from_static(AGGREGATE_CACHE));
    response
}
