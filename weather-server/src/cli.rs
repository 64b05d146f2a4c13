use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use weather_core::Config;
use weather_core::config::API_KEY_ENV;

use crate::{routes, state::AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-server",
    version,
    about = "Caching, rate-limited proxy in front of a weather API"
)]
pub struct Cli {
    /// Listen address, e.g. 127.0.0.1:3000. Overrides the config file.
    #[arg(long)]
    pub bind: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if config.api_key.is_none() {
            tracing::warn!(
                "no upstream API key configured; requests will fail with 500 until {API_KEY_ENV} is set"
            );
        }

        let state = AppState::from_config(&config)?;
        let app = routes::router(state);

        let listener = tokio::net::TcpListener::bind(&config.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind))?;
        tracing::info!("weather proxy listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("HTTP server terminated unexpectedly")?;

        Ok(())
    }
}
