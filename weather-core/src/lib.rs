//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration handling
//! - The TTL response cache and the fixed-window rate limiter
//! - Abstraction over the upstream weather provider
//! - Shared domain models (queries, normalized reports)
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod model;
pub mod provider;

pub use cache::ResponseCache;
pub use config::Config;
pub use error::WeatherError;
pub use limiter::{Decision, FixedWindowLimiter};
pub use model::{Units, WeatherParams, WeatherQuery, WeatherReport};
pub use provider::{OpenWeatherClient, WeatherProvider};
