//! NATS message handlers

pub mod ping;
pub mod trip;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::routing::{create_routing_service_with_fallback, RoutingService};

pub const SUBJECT_PING: &str = "hos.ping";
pub const SUBJECT_TRIP_PLAN: &str = "hos.trip.plan";

/// Start all message handlers
pub async fn start_handlers(client: Client, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let geocoder: Arc<dyn Geocoder> =
        Arc::from(create_geocoder(&config.geocoder_backend, &config.nominatim_url)?);
    info!("Geocoder initialized: {}", geocoder.name());

    // Create routing service with automatic OSRM detection
    let routing_service: Arc<dyn RoutingService> = Arc::from(
        create_routing_service_with_fallback(config.osrm_url.clone(), config.routing_timeout()).await,
    );
    info!("Routing service initialized: {}", routing_service.name());

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let trip_plan_sub = client.subscribe(SUBJECT_TRIP_PLAN).await?;

    info!("Subscribed to {}, {}", SUBJECT_PING, SUBJECT_TRIP_PLAN);

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let client_trip = client.clone();
    let trip_plan_handle = tokio::spawn(async move {
        trip::handle_plan(client_trip, trip_plan_sub, geocoder, routing_service).await
    });

    // Any handler finishing means its subscription is gone
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = trip_plan_handle => {
            error!("Trip plan handler finished: {:?}", result);
        }
    }

    Ok(())
}
