//! OSRM routing engine client
//!
//! OSRM API documentation:
//! https://project-osrm.org/docs/v5.24.0/api/#route-service

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::RoutingService;
use crate::types::{Coordinates, RouteSummary};

/// OSRM client configuration
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of OSRM server (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl OsrmConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OSRM routing client
pub struct OsrmClient {
    client: Client,
    config: OsrmConfig,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// `{base}/route/v1/driving/{lon,lat;...}` with full GeoJSON geometry
    pub fn route_url(&self, waypoints: &[Coordinates]) -> String {
        let coords = waypoints
            .iter()
            .map(|c| format!("{},{}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/driving/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            coords
        )
    }
}

#[async_trait]
impl RoutingService for OsrmClient {
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteSummary> {
        if waypoints.len() < 2 {
            anyhow::bail!("at least two waypoints are required, got {}", waypoints.len());
        }

        let url = self.route_url(waypoints);
        debug!("Requesting route from OSRM for {} waypoints", waypoints.len());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send route request to OSRM")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OSRM route returned error {}: {}", status, body);
        }

        let route_response: OsrmRouteResponse = response
            .json()
            .await
            .context("Failed to parse OSRM route response")?;

        let summary = route_response.into_route_summary()?;
        debug!(
            "Received route from OSRM: {:.1} mi, {:.2} h, {} points",
            summary.total_distance_miles(),
            summary.total_driving_hours(),
            summary.path().len()
        );

        Ok(summary)
    }

    fn name(&self) -> &str {
        "OSRM"
    }
}

// OSRM API types

/// Body of an OSRM `route` response
#[derive(Debug, Deserialize)]
pub struct OsrmRouteResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub geometry: OsrmGeometry,
}

/// GeoJSON LineString, `[lon, lat]` pairs
#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteResponse {
    /// Normalize the first route into a `RouteSummary`
    pub fn into_route_summary(self) -> Result<RouteSummary> {
        if self.code != "Ok" {
            anyhow::bail!(
                "OSRM returned code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            );
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .context("OSRM returned no routes")?;

        Ok(RouteSummary::from_provider(
            route.distance,
            route.duration,
            &route.geometry.coordinates,
        )?)
    }
}
