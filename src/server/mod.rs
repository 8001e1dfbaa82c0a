pub mod proxy;
pub mod push;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::push::PushStatus;
use crate::PushEngine;

/// Routes and per-route middleware. The reverse-proxy rewrite in
/// [`proxy::rewrite_proxy_headers`] must wrap this router from the outside
/// (`middleware::from_fn(...).layer(router)`), since it changes the request
/// path and therefore has to run before route matching.
pub fn build_router(engine: PushEngine) -> Router {
    Router::new()
        .route("/push/{token_arg}", post(push::push))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

async fn health() -> impl IntoResponse {
    axum::Json(PushStatus { status: "ok" })
}
