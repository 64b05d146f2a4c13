use anyhow::Result;
use std::sync::Arc;
use weather_core::{Config, FixedWindowLimiter, OpenWeatherClient, ResponseCache, WeatherProvider};

/// Shared state injected into the request pipeline.
///
/// The cache and limiter are owned here and reached only through their
/// operations; nothing else in the server touches their tables.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ResponseCache>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub provider: Arc<dyn WeatherProvider>,
}

impl AppState {
    pub fn new(
        cache: Arc<ResponseCache>,
        limiter: Arc<FixedWindowLimiter>,
        provider: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            cache,
            limiter,
            provider,
        }
    }

    /// Builds the full pipeline state from config and schedules the
    /// limiter's window-reset task. Must run inside a Tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = match config.cache_capacity {
            Some(capacity) => ResponseCache::with_capacity(config.cache_ttl(), capacity),
            None => ResponseCache::new(config.cache_ttl()),
        };

        let limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit_window(),
            config.rate_limit_max_requests,
        ));
        // Detached on purpose; the reset task runs for the process lifetime.
        let _ = limiter.spawn_reset_task();

        let provider = OpenWeatherClient::new(
            config.upstream_base_url.as_str(),
            config.api_key.clone(),
        )?;

        Ok(Self::new(
            Arc::new(cache),
            limiter,
            Arc::new(provider),
        ))
    }
}
