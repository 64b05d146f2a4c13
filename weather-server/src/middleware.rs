//! The two pipeline stages in front of the proxy handler.
//!
//! Order matters: the rate limiter is the outermost layer, so a 429
//! never touches the cache, and a cache hit has already been counted
//! against the client's window.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde_json::json;
use std::net::SocketAddr;
use weather_core::{Decision, ResponseCache};

use crate::state::AppState;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Client key when neither a socket address nor a forwarded header is present.
const FALLBACK_CLIENT_KEY: &str = "unknown";

/// Rate-limit stage. Counts the attempt, then either forwards the
/// request or short-circuits with 429 and a `Retry-After` hint.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = client_key(&req);
    match state.limiter.increment(&key) {
        Decision::Allowed => next.run(req).await,
        Decision::Limited { retry_after_secs } => {
            let mut res = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "too many requests, please slow down" })),
            )
                .into_response();
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            res
        }
    }
}

/// Cache stage. Only GET requests participate; everything else passes
/// through untouched.
///
/// On a fresh entry the stored payload is returned directly and the
/// downstream stages never run. On a miss the downstream response is
/// buffered; successful JSON responses are stored and tagged
/// `X-Cache: MISS`. Non-success responses carry no `X-Cache` header
/// and are never stored, so the next identical request retries the
/// upstream.
pub async fn response_cache(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    // Full path plus query string, in the order the client sent it.
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());
    let signature = ResponseCache::signature(req.method().as_str(), &path_and_query);

    if let Some(payload) = state.cache.lookup(&signature) {
        return cache_hit_response(payload, state.cache.ttl().as_secs());
    }

    let res = next.run(req).await;
    let (mut parts, body) = res.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to buffer downstream response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if parts.status.is_success() {
        if is_json(&parts.headers) {
            state.cache.store(&signature, bytes.clone());
        }
        parts.headers.insert(X_CACHE, HeaderValue::from_static("MISS"));
    }
    Response::from_parts(parts, Body::from(bytes))
}

fn cache_hit_response(payload: Bytes, ttl_secs: u64) -> Response {
    let mut res = Response::new(Body::from(payload));
    let headers = res.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={ttl_secs}")) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
    res
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Client identity for rate accounting: the connecting socket address
/// when the server knows it, else the first `X-Forwarded-For` entry,
/// else a shared fallback key.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    if let Some(first) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_owned();
        }
    }

    FALLBACK_CLIENT_KEY.to_owned()
}
