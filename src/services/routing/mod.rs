//! Routing service for road distance, duration and geometry
//!
//! Uses OSRM for production, mock for tests.

mod osrm;

pub use osrm::{OsrmClient, OsrmConfig, OsrmRouteResponse};

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::services::geo::path_miles;
use crate::types::{Coordinates, RouteSummary};

/// Routing service trait for abstraction (OSRM, mock, etc.)
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Route through `waypoints` in order
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteSummary>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Mock routing service for tests
/// Uses Haversine distance × coefficient for estimation
pub struct MockRoutingService {
    /// Coefficient for converting straight-line to road distance (default: 1.3)
    road_coefficient: f64,
    /// Average speed in mph for time estimation (default: 55)
    average_speed_mph: f64,
}

impl Default for MockRoutingService {
    fn default() -> Self {
        Self {
            road_coefficient: 1.3,
            average_speed_mph: 55.0,
        }
    }
}

impl MockRoutingService {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_params(road_coefficient: f64, average_speed_mph: f64) -> Self {
        Self {
            road_coefficient,
            average_speed_mph,
        }
    }
}

#[async_trait]
impl RoutingService for MockRoutingService {
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteSummary> {
        if waypoints.len() < 2 {
            anyhow::bail!("at least two waypoints are required, got {}", waypoints.len());
        }

        let miles = path_miles(waypoints) * self.road_coefficient;
        // Identical waypoints still need a positive duration downstream
        let hours = (miles / self.average_speed_mph).max(1.0 / 60.0);

        Ok(RouteSummary::new(miles, hours, waypoints.to_vec())?)
    }

    fn name(&self) -> &str {
        "MockRouting"
    }
}

/// Create routing service with automatic OSRM detection and fallback
///
/// Tries to connect to OSRM if URL is provided. Falls back to mock
/// routing service if OSRM is unavailable or URL is not configured.
pub async fn create_routing_service_with_fallback(
    osrm_url: Option<String>,
    timeout: Duration,
) -> Box<dyn RoutingService> {
    if let Some(url) = osrm_url {
        match check_osrm_health(&url).await {
            Ok(()) => match OsrmClient::new(OsrmConfig::new(&url).with_timeout(timeout)) {
                Ok(client) => {
                    info!("OSRM routing service available at {}", url);
                    return Box::new(client);
                }
                Err(e) => warn!("Failed to build OSRM client: {}. Falling back to mock routing.", e),
            },
            Err(e) => {
                warn!("OSRM not available at {}: {}. Falling back to mock routing.", url, e);
            }
        }
    }

    info!("Using mock routing service (OSRM not configured or unavailable)");
    Box::new(MockRoutingService::new())
}

/// Check OSRM health with a trivial one-point nearest query
async fn check_osrm_health(base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let url = format!("{}/nearest/v1/driving/0,0", base_url.trim_end_matches('/'));
    let response = client.get(&url).send().await?;

    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("OSRM returned status {}", response.status())
    }
}
