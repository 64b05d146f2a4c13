//! Binary crate for the weather proxy server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Wiring the request pipeline: rate limiter, response cache, proxy handler
//! - Serving the HTTP endpoint

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_server=debug,weather_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = weather_server::cli::Cli::parse();
    cli.run().await
}
