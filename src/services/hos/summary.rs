//! Trip summary

use chrono::NaiveDateTime;

use super::{round_to, SERVICE_HOURS};
use crate::types::TripSummary;

/// Trip-level totals.
///
/// `total_trip_hours` only adds the pickup and dropoff service hours to the
/// driving time; rests, breaks, fuel stops and restarts are not included.
pub fn build_summary(
    total_distance_miles: f64,
    total_driving_hours: f64,
    end_time: NaiveDateTime,
) -> TripSummary {
    TripSummary {
        total_distance_miles: round_to(total_distance_miles, 1),
        total_driving_hours: round_to(total_driving_hours, 1),
        total_trip_hours: round_to(total_driving_hours + 2.0 * SERVICE_HOURS, 1),
        estimated_arrival: end_time,
    }
}
