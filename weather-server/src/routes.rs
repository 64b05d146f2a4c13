use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use weather_core::{WeatherError, WeatherParams, WeatherQuery};

use crate::middleware::{rate_limit, response_cache};
use crate::state::AppState;

/// Assembles the request pipeline.
///
/// Layers run outside-in, so the order here puts the rate limiter
/// first, then the response cache, then the proxy handler. `/health`
/// is registered after the layers and skips both stages.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather", get(get_weather))
        .layer(from_fn_with_state(state.clone(), response_cache))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// The proxy handler: validate the query, make the one upstream call,
/// and return the normalized report with a cacheability hint matching
/// the middleware TTL.
async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Response {
    let query = match WeatherQuery::try_from(params) {
        Ok(query) => query,
        Err(err) => return error_response(&err),
    };

    match state.provider.fetch_weather(&query).await {
        Ok(report) => {
            let max_age = state.cache.ttl().as_secs();
            let mut res = Json(report).into_response();
            if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={max_age}")) {
                res.headers_mut().insert(header::CACHE_CONTROL, value);
            }
            res
        }
        Err(err) => error_response(&err),
    }
}

/// Maps the core error taxonomy onto HTTP statuses and the JSON error
/// body shape `{error, details?}`.
fn error_response(err: &WeatherError) -> Response {
    let status = match err {
        WeatherError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        WeatherError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
        WeatherError::UpstreamStatus { .. }
        | WeatherError::UpstreamFetch(_)
        | WeatherError::UpstreamDecode(_) => StatusCode::BAD_GATEWAY,
    };

    let mut body = json!({ "error": err.to_string() });
    if let WeatherError::UpstreamStatus {
        body: upstream_body,
        ..
    } = err
    {
        body["details"] = json!(upstream_body);
    }

    tracing::warn!(%err, status = status.as_u16(), "weather request failed");
    (status, Json(body)).into_response()
}
