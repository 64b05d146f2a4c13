use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Sentinel used when the upstream payload omits a text field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Unit system forwarded to the provider. Defaults to metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(WeatherError::InvalidQuery(format!(
                "unknown units '{value}'; expected metric, imperial or standard"
            ))),
        }
    }
}

/// Raw query parameters as they arrive on the wire.
///
/// Everything is a string here so that a malformed `lat=abc` becomes a
/// controlled 400 instead of a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherParams {
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub units: Option<String>,
}

/// Where to look the weather up: exactly one of the two forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Place(String),
    Coords { lat: f64, lon: f64 },
}

/// A validated weather query, ready for the upstream client.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Location,
    pub units: Units,
}

impl TryFrom<WeatherParams> for WeatherQuery {
    type Error = WeatherError;

    fn try_from(params: WeatherParams) -> Result<Self, Self::Error> {
        let units = match params.units.as_deref() {
            Some(u) => Units::try_from(u)?,
            None => Units::default(),
        };

        let place = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let location = match (place, params.lat.as_deref(), params.lon.as_deref()) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(WeatherError::InvalidQuery(
                    "provide either q or lat/lon, not both".into(),
                ));
            }
            (Some(place), None, None) => Location::Place(place.to_owned()),
            (None, Some(lat), Some(lon)) => Location::Coords {
                lat: parse_coord("lat", lat)?,
                lon: parse_coord("lon", lon)?,
            },
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(WeatherError::InvalidQuery(
                    "both lat and lon are required for a coordinate lookup".into(),
                ));
            }
            (None, None, None) => {
                return Err(WeatherError::InvalidQuery(
                    "provide a place name (q) or coordinates (lat and lon)".into(),
                ));
            }
        };

        Ok(WeatherQuery { location, units })
    }
}

fn parse_coord(name: &str, raw: &str) -> Result<f64, WeatherError> {
    raw.trim().parse().map_err(|_| {
        WeatherError::InvalidQuery(format!("{name} must be a number, got '{raw}'"))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The normalized record returned to callers.
///
/// The shape is stable regardless of which fields the provider happened
/// to include: missing text fields become `"N/A"`, missing numeric and
/// timestamp fields are serialized as explicit `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub coord: Option<Coordinates>,
    pub weather: String,
    pub description: String,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub dt: Option<i64>,
}
