//! Trip planning handler (`hos.trip.plan`)

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::defaults::default_start_time;
use crate::error::{PlanError, PlanResult};
use crate::services::geocoding::Geocoder;
use crate::services::hos::{plan_trip, TripParams};
use crate::services::routing::RoutingService;
use crate::types::{
    Coordinates, ErrorResponse, LocationInput, Plan, PlanTripRequest, Request, RouteSummary,
    SuccessResponse,
};

/// Handle hos.trip.plan messages
pub async fn handle_plan(
    client: Client,
    mut subscriber: Subscriber,
    geocoder: Arc<dyn Geocoder>,
    routing_service: Arc<dyn RoutingService>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.plan message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<PlanTripRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let result = plan_trip_request(
            &request.payload,
            geocoder.as_ref(),
            routing_service.as_ref(),
            default_start_time(),
        )
        .await;

        if let Err(ref e) = result {
            warn!("Trip plan {} rejected: {}", request.id, e);
        }

        let _ = client.publish(reply, reply_bytes(request.id, result)?.into()).await;
    }

    Ok(())
}

/// Serialize a plan outcome into the reply envelope
pub fn reply_bytes(request_id: Uuid, result: PlanResult<Plan>) -> Result<Vec<u8>> {
    let bytes = match result {
        Ok(plan) => serde_json::to_vec(&SuccessResponse::new(request_id, plan))?,
        Err(e) => serde_json::to_vec(&ErrorResponse::from_plan_error(request_id, &e))?,
    };
    Ok(bytes)
}

/// Trip locations after geocoding
#[derive(Debug, Clone)]
pub struct ResolvedTrip {
    pub current: Coordinates,
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
}

impl ResolvedTrip {
    pub fn waypoints(&self) -> [Coordinates; 3] {
        [self.current, self.pickup, self.dropoff]
    }
}

/// Validate, geocode, route and plan one request
pub async fn plan_trip_request(
    request: &PlanTripRequest,
    geocoder: &dyn Geocoder,
    routing_service: &dyn RoutingService,
    now: NaiveDateTime,
) -> PlanResult<Plan> {
    request.validate()?;
    let start_time = parse_start_date(request.start_date.as_deref(), now)?;
    let resolved = resolve_trip(request, geocoder).await?;

    let route = routing_service
        .route(&resolved.waypoints())
        .await
        .map_err(|e| {
            error!("Routing via {} failed: {:#}", routing_service.name(), e);
            PlanError::upstream(format!("{:#}", e))
        })?;

    plan_resolved(request, &resolved, &route, start_time)
}

/// Plan against an already-known route
pub fn plan_resolved(
    request: &PlanTripRequest,
    resolved: &ResolvedTrip,
    route: &RouteSummary,
    start_time: NaiveDateTime,
) -> PlanResult<Plan> {
    let params = TripParams {
        start_time,
        starting_cycle_hours: request.current_cycle_used,
        current_label: request.current_location.label(),
        pickup: resolved.pickup,
        pickup_label: request.pickup_location.label(),
        dropoff: resolved.dropoff,
        dropoff_label: request.dropoff_location.label(),
    };

    let plan = plan_trip(&params, route)?;
    info!(
        "Planned {} -> {}: {:.1} mi, {:.1} h driving, {} days, arrival {}",
        params.pickup_label,
        params.dropoff_label,
        plan.summary.total_distance_miles,
        plan.summary.total_driving_hours,
        plan.logs.len(),
        plan.summary.estimated_arrival
    );
    Ok(plan)
}

/// Resolve all three locations, geocoding the ones without coordinates
pub async fn resolve_trip(request: &PlanTripRequest, geocoder: &dyn Geocoder) -> PlanResult<ResolvedTrip> {
    Ok(ResolvedTrip {
        current: resolve_location(&request.current_location, geocoder).await?,
        pickup: resolve_location(&request.pickup_location, geocoder).await?,
        dropoff: resolve_location(&request.dropoff_location, geocoder).await?,
    })
}

async fn resolve_location(location: &LocationInput, geocoder: &dyn Geocoder) -> PlanResult<Coordinates> {
    if let Some(coords) = location.coordinates() {
        return Ok(coords);
    }

    match geocoder.geocode(&location.address).await {
        Ok(Some(coords)) if coords.is_valid() => {
            debug!("Geocoded '{}' to ({}, {})", location.address, coords.lat, coords.lng);
            Ok(coords)
        }
        Ok(_) => Err(PlanError::invalid("Invalid locations")),
        Err(e) => Err(PlanError::upstream(format!(
            "geocoding '{}' via {} failed: {:#}",
            location.address,
            geocoder.name(),
            e
        ))),
    }
}

/// Start timestamp from the request, or `now` when absent.
///
/// Accepts a naive ISO-8601 timestamp, a bare date (midnight), or RFC 3339
/// with an offset, in which case the local wall time is kept as given.
pub fn parse_start_date(value: Option<&str>, now: NaiveDateTime) -> PlanResult<NaiveDateTime> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(now),
        Some(v) => v,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(PlanError::invalid(format!("startDate '{}' is not an ISO-8601 timestamp", value)))
}
