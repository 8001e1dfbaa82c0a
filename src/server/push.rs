//! Ingestion handler: authenticate the token, derive the storage hostname,
//! write the payload with a TTL plus a last-seen timestamp.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::StoreError;
use crate::PushEngine;

/// Key namespace shared with the monitoring backend that reads the data back.
pub const KEY_PREFIX: &str = "check_mk_push_agent";
/// Seconds a pushed payload stays retrievable before the store expires it.
pub const DATA_LIFETIME_SECS: u64 = 90;

#[derive(Serialize)]
pub struct PushStatus {
    pub status: &'static str,
}

// ========================================
// ERRORS
// ========================================

#[derive(Debug)]
pub enum PushError {
    /// Base token not present in the registry.
    UnknownToken,
    /// More than one `:` separator in the token argument.
    MalformedToken,
    /// The key-value store rejected or dropped a write.
    Store(StoreError),
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushError::UnknownToken => write!(f, "unknown token"),
            PushError::MalformedToken => write!(f, "malformed token argument"),
            PushError::Store(e) => write!(f, "store write failed: {}", e),
        }
    }
}

impl std::error::Error for PushError {}

impl From<StoreError> for PushError {
    fn from(error: StoreError) -> Self {
        PushError::Store(error)
    }
}

impl IntoResponse for PushError {
    fn into_response(self) -> Response {
        let status = match &self {
            PushError::UnknownToken => StatusCode::NOT_FOUND,
            PushError::MalformedToken => StatusCode::BAD_REQUEST,
            PushError::Store(e) => {
                tracing::error!("store write failed: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        let body = Json(serde_json::json!({
            "status": "error",
            "reason": self.to_string(),
        }));
        (status, body).into_response()
    }
}

// ========================================
// HANDLER
// ========================================

/// `POST /push/{token_arg}` where `token_arg` is `token` or `token:suffix`.
pub async fn push(
    State(engine): State<PushEngine>,
    Path(token_arg): Path<String>,
    body: Bytes,
) -> Result<Json<PushStatus>, PushError> {
    let mut parts = token_arg.split(':');
    let token = parts.next().unwrap_or("");
    let suffix = parts.next();
    if parts.next().is_some() {
        return Err(PushError::MalformedToken);
    }

    let base_hostname = engine
        .registry
        .lookup(token)
        .ok_or(PushError::UnknownToken)?;

    // One base token can address sub-targets via `token:suffix`
    let hostname = match suffix {
        Some(suffix) => format!("{}:{}", base_hostname, suffix),
        None => base_hostname.to_string(),
    };

    // Two best-effort writes, no transaction between them
    let data_key = format!("{}:data:{}", KEY_PREFIX, hostname);
    engine
        .store
        .set_ex(&data_key, body, DATA_LIFETIME_SECS)
        .await?;

    let last_seen_key = format!("{}:last_seen", KEY_PREFIX);
    let now = epoch_seconds();
    engine
        .store
        .hset(&last_seen_key, &hostname, &now.to_string())
        .await?;

    tracing::debug!(hostname = %hostname, "stored push payload");
    Ok(Json(PushStatus { status: "ok" }))
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
