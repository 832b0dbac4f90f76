//! HOS Planner - Hours-of-Service trip planning worker
//!
//! Connects to NATS and answers trip planning requests with a duty
//! timeline, daily logs and a trip summary. `plan` runs one trip offline.

mod cli;
mod config;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::services::geocoding::create_geocoder;
use crate::services::routing::{create_routing_service_with_fallback, OsrmRouteResponse};
use crate::types::PlanTripRequest;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "hos-planner.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // stdout carries the plan JSON in `plan` mode, so logs go to stderr there
    let cli = Cli::parse();
    let offline = matches!(cli.command, Some(Command::Plan { .. }));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hos_planner=debug".into()),
        ))
        .with((!offline).then(|| tracing_subscriber::fmt::layer()))
        .with(offline.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Plan { trip, route } => plan_offline(&config, &trip, route.as_deref()).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting HOS Planner worker...");

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (&config.nats_user, &config.nats_password) {
        (Some(user), Some(password)) => {
            async_nats::ConnectOptions::new()
                .user_and_password(user.clone(), password.clone())
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    if let Err(e) = handlers::start_handlers(nats_client, &config).await {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn plan_offline(config: &Config, trip_path: &Path, route_path: Option<&Path>) -> Result<()> {
    let raw = std::fs::read_to_string(trip_path)
        .with_context(|| format!("Failed to read trip file {}", trip_path.display()))?;
    let request: PlanTripRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse trip file {}", trip_path.display()))?;

    let geocoder = create_geocoder(&config.geocoder_backend, &config.nominatim_url)?;
    let now = defaults::default_start_time();

    let plan = match route_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read route file {}", path.display()))?;
            let response: OsrmRouteResponse = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse route file {}", path.display()))?;
            let route = response.into_route_summary()?;

            request.validate()?;
            let start_time = handlers::trip::parse_start_date(request.start_date.as_deref(), now)?;
            let resolved = handlers::trip::resolve_trip(&request, geocoder.as_ref()).await?;
            handlers::trip::plan_resolved(&request, &resolved, &route, start_time)?
        }
        None => {
            let routing_service =
                create_routing_service_with_fallback(config.osrm_url.clone(), config.routing_timeout()).await;
            handlers::trip::plan_trip_request(&request, geocoder.as_ref(), routing_service.as_ref(), now)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
