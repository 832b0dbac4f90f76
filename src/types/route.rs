//! Route types

use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::error::{PlanError, PlanResult};

/// Meters per statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Normalized route facts handed to the simulator.
///
/// Immutable once built; the constructors guarantee a non-empty path and a
/// positive driving duration. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRouteSummary")]
pub struct RouteSummary {
    total_distance_miles: f64,
    total_driving_hours: f64,
    path: Vec<Coordinates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRouteSummary {
    total_distance_miles: f64,
    total_driving_hours: f64,
    path: Vec<Coordinates>,
}

impl TryFrom<RawRouteSummary> for RouteSummary {
    type Error = PlanError;

    fn try_from(raw: RawRouteSummary) -> PlanResult<Self> {
        Self::new(raw.total_distance_miles, raw.total_driving_hours, raw.path)
    }
}

impl RouteSummary {
    pub fn new(
        total_distance_miles: f64,
        total_driving_hours: f64,
        path: Vec<Coordinates>,
    ) -> PlanResult<Self> {
        if path.is_empty() {
            return Err(PlanError::invalid("route path is empty"));
        }
        if !total_driving_hours.is_finite() || total_driving_hours <= 0.0 {
            return Err(PlanError::invalid(format!(
                "route driving hours must be positive, got {}",
                total_driving_hours
            )));
        }
        if !total_distance_miles.is_finite() || total_distance_miles < 0.0 {
            return Err(PlanError::invalid(format!(
                "route distance must be non-negative, got {}",
                total_distance_miles
            )));
        }

        Ok(Self {
            total_distance_miles,
            total_driving_hours,
            path,
        })
    }

    /// Build from a road-routing provider response: distance in meters,
    /// duration in seconds, geometry in GeoJSON `[lon, lat]` order.
    pub fn from_provider(
        distance_meters: f64,
        duration_seconds: f64,
        coordinates_lon_lat: &[[f64; 2]],
    ) -> PlanResult<Self> {
        let path = coordinates_lon_lat
            .iter()
            .map(|[lon, lat]| Coordinates { lat: *lat, lng: *lon })
            .collect();

        Self::new(
            distance_meters / METERS_PER_MILE,
            duration_seconds / SECONDS_PER_HOUR,
            path,
        )
    }

    pub fn total_distance_miles(&self) -> f64 {
        self.total_distance_miles
    }

    pub fn total_driving_hours(&self) -> f64 {
        self.total_driving_hours
    }

    pub fn path(&self) -> &[Coordinates] {
        &self.path
    }

    /// Average speed over the whole route in miles per hour
    pub fn average_speed_mph(&self) -> f64 {
        self.total_distance_miles / self.total_driving_hours
    }

    /// Skips validation, for exercising the simulator's own guards
    #[cfg(test)]
    pub(crate) fn unchecked(total_distance_miles: f64, total_driving_hours: f64, path: Vec<Coordinates>) -> Self {
        Self {
            total_distance_miles,
            total_driving_hours,
            path,
        }
    }
}
