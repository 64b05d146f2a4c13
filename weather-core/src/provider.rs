use crate::{
    error::WeatherError,
    model::{WeatherQuery, WeatherReport},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Abstraction over the upstream weather provider.
///
/// One outbound call per invocation, bounded by the client timeout, no
/// internal retries: every failure is surfaced to the caller as a
/// [`WeatherError`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError>;
}
