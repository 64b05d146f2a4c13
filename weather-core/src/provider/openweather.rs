use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{Location, WeatherQuery, WeatherReport, NOT_AVAILABLE},
};

use super::WeatherProvider;

/// Hard ceiling on one outbound call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeather "current weather" endpoint.
///
/// Holds the server-side API key; the key is attached to the outbound
/// URL only and must never reach responses, error messages or logs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(WeatherError::MissingCredential)?;

        let mut params: Vec<(&str, String)> = Vec::with_capacity(4);
        match &query.location {
            Location::Place(place) => params.push(("q", place.clone())),
            Location::Coords { lat, lon } => {
                params.push(("lat", lat.to_string()));
                params.push(("lon", lon.to_string()));
            }
        }
        params.push(("units", query.units.as_str().to_string()));
        params.push(("appid", api_key.to_string()));

        debug!(location = ?query.location, units = %query.units, "fetching current weather");

        let res = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(&params)
            .send()
            .await
            // The URL carries the credential; strip it before the error
            // can reach a log line or a response body.
            .map_err(|e| WeatherError::UpstreamFetch(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::UpstreamFetch(e.without_url()))?;

        if !status.is_success() {
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(WeatherError::UpstreamDecode)?;

        Ok(normalize(parsed))
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    coord: Option<OwCoord>,
    dt: Option<i64>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    sys: OwSys,
}

/// Projects the raw payload into the stable report shape. Absent text
/// fields become `"N/A"`, absent numbers and timestamps become `None`
/// so they serialize as explicit `null`.
fn normalize(raw: OwCurrentResponse) -> WeatherReport {
    let first_weather = raw.weather.first();

    WeatherReport {
        name: raw.name.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        coord: raw.coord.map(|c| crate::model::Coordinates {
            lat: c.lat,
            lon: c.lon,
        }),
        weather: first_weather
            .and_then(|w| w.main.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        description: first_weather
            .and_then(|w| w.description.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        temp: raw.main.temp,
        feels_like: raw.main.feels_like,
        sunrise: raw.sys.sunrise,
        sunset: raw.sys.sunset,
        dt: raw.dt,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary so the slice cannot split a
    // multi-byte character.
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}
