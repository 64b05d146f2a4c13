use thiserror::Error;

/// Error taxonomy for the proxy core.
///
/// Each variant maps to exactly one HTTP status in the server layer:
/// `InvalidQuery` -> 400, `MissingCredential` -> 500, the upstream
/// variants -> 502. Nothing here is retried internally; every failure
/// is surfaced to the caller at once.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The caller supplied an unusable combination of query parameters.
    #[error("{0}")]
    InvalidQuery(String),

    /// The upstream API key was not configured. Every request fails the
    /// same way until an operator fixes the configuration.
    #[error("server is not configured with an upstream API key")]
    MissingCredential,

    /// The provider answered with a non-success status.
    #[error("upstream request failed with status {status}")]
    UpstreamStatus { status: u16, body: String },

    /// The request never produced an upstream response (timeout, DNS,
    /// connection refused). Distinct from an upstream-reported error.
    #[error("failed to fetch from upstream")]
    UpstreamFetch(#[source] reqwest::Error),

    /// The provider answered 2xx but the payload was not the expected JSON.
    #[error("failed to decode upstream response")]
    UpstreamDecode(#[source] serde_json::Error),
}
