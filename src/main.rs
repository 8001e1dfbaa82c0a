use std::sync::Arc;

use axum::extract::Request;
use axum::ServiceExt;
use tokio::net::TcpListener;
use tower::Layer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mk_push_server::config::Config;
use mk_push_server::registry::TokenRegistry;
use mk_push_server::server::{build_router, proxy};
use mk_push_server::store::{KvStore, MemoryStore, RedisStore};
use mk_push_server::PushEngine;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = Config::global();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    // Registry load is fatal on any malformed line: never serve with a
    // partial token mapping.
    let Some(token_file) = config.store.token_file.as_deref() else {
        error!("TOKEN_FILE is not set");
        std::process::exit(1);
    };
    let registry = match TokenRegistry::load(token_file) {
        Ok(registry) => registry,
        Err(e) => {
            error!("failed to load token file {}: {}", token_file, e);
            std::process::exit(1);
        }
    };
    info!("loaded {} tokens from {}", registry.len(), token_file);

    let store: Arc<dyn KvStore> = match config.store.redis_socket.as_deref() {
        Some(socket) => {
            info!("using redis store at {}", socket);
            Arc::new(RedisStore::new(socket))
        }
        None => {
            info!("using in-memory store");
            Arc::new(MemoryStore::new(config.store.cleanup_interval_secs))
        }
    };

    let engine = PushEngine::new(Arc::new(registry), store);

    // The proxy rewrite wraps the router so it runs before route matching
    let app = axum::middleware::from_fn(proxy::rewrite_proxy_headers).layer(build_router(engine));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    info!("push server listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .expect("Failed to start push server");
}
