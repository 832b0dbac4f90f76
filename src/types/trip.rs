//! Trip input types

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A location as supplied by the caller. Coordinates may be omitted, in
/// which case the address is geocoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: String,
}

impl LocationInput {
    /// Coordinates given directly by the caller, if both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// Label used in segment reasons and log remarks
    pub fn label(&self) -> String {
        if !self.address.trim().is_empty() {
            return self.address.clone();
        }
        match self.coordinates() {
            Some(c) => format!("{:.4}, {:.4}", c.lat, c.lng),
            None => "Unknown location".to_string(),
        }
    }
}

/// Request to plan an HOS-compliant trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripRequest {
    pub current_location: LocationInput,
    pub pickup_location: LocationInput,
    pub dropoff_location: LocationInput,
    /// Hours already used in the current 70-hour/8-day cycle
    #[serde(default)]
    pub current_cycle_used: f64,
    /// ISO-8601 start timestamp; defaults to now
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub co_driver_name: Option<String>,
    #[serde(default)]
    pub truck_number: Option<String>,
    #[serde(default)]
    pub trailer_number: Option<String>,
}

impl PlanTripRequest {
    /// Checks that do not need any collaborator
    pub fn validate(&self) -> PlanResult<()> {
        if !self.current_cycle_used.is_finite() || self.current_cycle_used < 0.0 {
            return Err(PlanError::invalid(format!(
                "currentCycleUsed must be a non-negative number, got {}",
                self.current_cycle_used
            )));
        }

        for (name, location) in [
            ("currentLocation", &self.current_location),
            ("pickupLocation", &self.pickup_location),
            ("dropoffLocation", &self.dropoff_location),
        ] {
            if location.lat.is_some() != location.lng.is_some() {
                return Err(PlanError::invalid(format!("{name} has only one coordinate")));
            }
            if let Some(coords) = location.coordinates() {
                if !coords.is_valid() {
                    return Err(PlanError::invalid(format!(
                        "{name} has invalid coordinates ({}, {})",
                        coords.lat, coords.lng
                    )));
                }
            } else if location.address.trim().is_empty() {
                return Err(PlanError::invalid("Invalid locations"));
            }
        }

        Ok(())
    }
}
