//! Plan assembly

use chrono::NaiveDateTime;

use super::{build_logs, build_summary, simulate, Simulation, TripContext, CLOCK_FORMAT};
use crate::error::PlanResult;
use crate::types::{Coordinates, DailyLog, Plan, PlanRoute, RouteSummary, TimelineEntry, TripSummary};

/// Caller-supplied trip parameters (everything but the route)
#[derive(Debug, Clone)]
pub struct TripParams {
    pub start_time: NaiveDateTime,
    pub starting_cycle_hours: f64,
    pub current_label: String,
    pub pickup: Coordinates,
    pub pickup_label: String,
    pub dropoff: Coordinates,
    pub dropoff_label: String,
}

/// Wrap simulator output, logs and summary into the caller-facing plan
pub fn assemble_plan(simulation: Simulation, logs: Vec<DailyLog>, summary: TripSummary) -> Plan {
    let timeline = simulation
        .segments
        .iter()
        .map(|segment| TimelineEntry {
            day: segment.day,
            start: segment.start.format(CLOCK_FORMAT).to_string(),
            end: segment.end.format(CLOCK_FORMAT).to_string(),
            status: segment.status,
            reason: segment.reason_or_empty().to_string(),
        })
        .collect();

    Plan {
        route: PlanRoute {
            path: simulation.path,
            stops: simulation.stops,
        },
        timeline,
        logs,
        summary,
    }
}

/// Run the whole core pipeline for one trip
pub fn plan_trip(params: &TripParams, route: &RouteSummary) -> PlanResult<Plan> {
    let ctx = TripContext {
        route,
        pickup: params.pickup,
        dropoff: params.dropoff,
        pickup_label: &params.pickup_label,
        dropoff_label: &params.dropoff_label,
    };

    let simulation = simulate(params.start_time, params.starting_cycle_hours, &ctx)?;
    let logs = build_logs(
        &simulation.segments,
        &params.current_label,
        &params.pickup_label,
        &params.dropoff_label,
    );
    let summary = build_summary(
        simulation.total_distance_miles,
        simulation.total_driving_hours,
        simulation.end_time,
    );

    Ok(assemble_plan(simulation, logs, summary))
}
