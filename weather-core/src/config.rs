use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the upstream API key. Takes precedence
/// over the config file so the secret can stay out of it entirely.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Runtime configuration for the proxy.
///
/// Loaded from an optional TOML file with every field defaulted, then
/// overridden from the environment. A missing API key is not a load
/// error: the server starts and answers 500 per request until the key
/// is supplied (see `WeatherError::MissingCredential`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: String,

    /// Base URL of the provider API, without a trailing slash.
    pub upstream_base_url: String,

    /// Provider API key. Never logged and never echoed in responses.
    pub api_key: Option<String>,

    /// How long a cached response stays fresh.
    pub cache_ttl_secs: u64,

    /// Length of one rate-limit window.
    pub rate_limit_window_ms: u64,

    /// Requests a single client may make per window.
    pub rate_limit_max_requests: u32,

    /// Optional ceiling on distinct cached signatures. Unset means the
    /// cache grows with the number of distinct requests seen.
    pub cache_capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            upstream_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
            cache_ttl_secs: 60,
            rate_limit_window_ms: 60_000,
            rate_limit_max_requests: 30,
            cache_capacity: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file, or defaults when `path` is `None`
    /// or the file does not exist. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            cfg.api_key = Some(key);
        }

        Ok(cfg)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let cfg = Config::default();
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
        assert_eq!(cfg.rate_limit_window(), Duration::from_millis(60_000));
        assert_eq!(cfg.rate_limit_max_requests, 30);
        assert!(cfg.api_key.is_none());
        assert!(cfg.cache_capacity.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            cache_ttl_secs = 120
            rate_limit_max_requests = 5
            "#,
        )
        .expect("partial config must parse");

        assert_eq!(cfg.cache_ttl_secs, 120);
        assert_eq!(cfg.rate_limit_max_requests, 5);
        assert_eq!(cfg.rate_limit_window_ms, 60_000);
        assert_eq!(
            cfg.upstream_base_url,
            "https://api.openweathermap.org/data/2.5"
        );
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
            bind = "0.0.0.0:8080"
            api_key = "from-file"
            rate_limit_window_ms = 1000
            "#
        )
        .expect("write temp config");

        let cfg = Config::load(Some(file.path())).expect("load must succeed");
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.rate_limit_window(), Duration::from_millis(1000));
    }

    #[test]
    fn load_with_missing_file_uses_defaults() {
        let cfg = Config::load(Some(Path::new("/nonexistent/weather-proxy.toml")))
            .expect("missing file falls back to defaults");
        assert_eq!(cfg.cache_ttl_secs, 60);
    }
}
