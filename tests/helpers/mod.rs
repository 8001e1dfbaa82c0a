use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::{Layer, ServiceExt};

use mk_push_server::registry::TokenRegistry;
use mk_push_server::server::{build_router, proxy};
use mk_push_server::store::{KvStore, MemoryStore, StoreError};
use mk_push_server::PushEngine;

pub fn setup_router(tokens: &str) -> (Router, Arc<MemoryStore>) {
    let registry = TokenRegistry::parse(tokens).expect("Token file should parse");
    let store = Arc::new(MemoryStore::new(60));
    let engine = PushEngine::new(Arc::new(registry), store.clone());
    (build_router(engine), store)
}

/// Router wrapped the way main serves it: proxy rewrite outside the router.
pub fn setup_app(
    tokens: &str,
) -> (
    impl tower::Service<Request<Body>, Response = Response, Error = Infallible>,
    Arc<MemoryStore>,
) {
    let (router, store) = setup_router(tokens);
    let app = axum::middleware::from_fn(proxy::rewrite_proxy_headers).layer(router);
    (app, store)
}

/// Store stub that rejects every write, for exercising the dependency-failure path.
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn set_ex(&self, _key: &str, _value: Bytes, _ttl_secs: u64) -> Result<(), StoreError> {
        Err(StoreError::Protocol("injected failure".to_string()))
    }

    async fn hset(&self, _key: &str, _field: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Protocol("injected failure".to_string()))
    }
}

pub async fn post<S>(app: S, uri: &str, body: impl Into<Body>) -> (StatusCode, String)
where
    S: tower::Service<Request<Body>, Response = Response, Error = Infallible>,
{
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap();
    send(app, request).await
}

pub async fn send<S>(app: S, request: Request<Body>) -> (StatusCode, String)
where
    S: tower::Service<Request<Body>, Response = Response, Error = Infallible>,
{
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}
