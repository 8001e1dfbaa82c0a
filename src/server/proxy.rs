//! Reverse-proxy adaptation. When an upstream proxy mounts the app under a
//! prefix it announces the prefix in `X-Script-Name`; requests must be routed
//! as if the prefix were not there. `X-Scheme` carries the original external
//! scheme for any scheme-dependent response content.

use axum::extract::Request;
use axum::http::uri::PathAndQuery;
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;

pub const SCRIPT_NAME_HEADER: &str = "x-script-name";
pub const SCHEME_HEADER: &str = "x-scheme";

/// Original external URL scheme (`http`/`https`) as reported by the proxy,
/// stashed in request extensions for handlers that build absolute URLs.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardedScheme(pub String);

pub async fn rewrite_proxy_headers(mut req: Request, next: Next) -> Response {
    let script_name = req
        .headers()
        .get(SCRIPT_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty());

    if let Some(script_name) = script_name {
        if let Some(stripped) = req.uri().path().strip_prefix(script_name.as_str()) {
            let path = if stripped.is_empty() { "/" } else { stripped };
            let path_and_query = match req.uri().query() {
                Some(query) => format!("{}?{}", path, query),
                None => path.to_string(),
            };
            let mut parts = req.uri().clone().into_parts();
            parts.path_and_query = PathAndQuery::try_from(path_and_query.as_str()).ok();
            if let Ok(uri) = Uri::from_parts(parts) {
                *req.uri_mut() = uri;
            }
        }
    }

    let scheme = req
        .headers()
        .get(SCHEME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    if let Some(scheme) = scheme {
        req.extensions_mut().insert(ForwardedScheme(scheme));
    }

    next.run(req).await
}
