//! HOS timeline simulation.
//!
//! Walks the trip as a state machine and emits one duty segment per
//! transition. `next_action` decides, `apply` performs, and `step` is the
//! pure composition of the two so individual transitions can be tested
//! without running a whole trip.
//!
//! Priority of each step, highest first:
//! restart (cycle exhausted) > dropoff (nothing left to drive) >
//! daily reset > 30-min break > fuel stop > driving.
//!
//! A dropoff that would end past the 14-hour window is preceded by a reset.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, trace};

use super::{
    BREAK_AFTER_DRIVING_HOURS, BREAK_HOURS, CYCLE_LIMIT_HOURS, DAILY_RESET_HOURS,
    EPSILON_HOURS, FUEL_INTERVAL_MILES, FUEL_STOP_HOURS, MAX_DRIVING_HOURS,
    ON_DUTY_WINDOW_HOURS, RESTART_HOURS, SERVICE_HOURS,
};
use crate::error::{PlanError, PlanResult};
use crate::types::{Coordinates, DutySegment, DutyStatus, RouteSummary, Stop, StopType};

/// Fixed inputs shared by every step of one simulation
#[derive(Debug, Clone, Copy)]
pub struct TripContext<'a> {
    pub route: &'a RouteSummary,
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
    pub pickup_label: &'a str,
    pub dropoff_label: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the pickup service
    AtOrigin,
    EnRoute,
    /// Dropoff emitted, simulation finished
    Arrived,
}

/// Mutable counters threaded through the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub phase: Phase,
    pub clock: NaiveDateTime,
    /// Start of the current 14-hour window, moved by every 10h/34h rest
    pub window_start: NaiveDateTime,
    /// Simulator day counter: +1 per daily reset, +2 per restart
    pub day: u32,
    pub driving_today: f64,
    pub on_duty_today: f64,
    pub driving_since_break: f64,
    /// On-duty hours in the 70-hour cycle, seeded with the caller's balance
    pub cycle_hours: f64,
    pub remaining_driving_hours: f64,
    pub miles_since_fuel: f64,
    /// Set by a fuel stop, cleared by the next driving chunk
    pub refueled: bool,
    /// Approximate position along the path, in path points
    pub path_index: usize,
}

impl SimState {
    pub fn new(start_time: NaiveDateTime, starting_cycle_hours: f64, route: &RouteSummary) -> Self {
        Self {
            phase: Phase::AtOrigin,
            clock: start_time,
            window_start: start_time,
            day: 1,
            driving_today: 0.0,
            on_duty_today: 0.0,
            driving_since_break: 0.0,
            cycle_hours: starting_cycle_hours,
            remaining_driving_hours: route.total_driving_hours(),
            miles_since_fuel: 0.0,
            refueled: false,
            path_index: 0,
        }
    }

    pub fn hours_in_window(&self) -> f64 {
        duration_to_hours(self.clock - self.window_start)
    }

    fn window_left(&self) -> f64 {
        ON_DUTY_WINDOW_HOURS - self.hours_in_window()
    }
}

/// What the next segment will be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Pickup,
    Restart,
    Dropoff,
    DailyReset,
    Break,
    FuelStop,
    /// Drive for the given number of hours
    Drive(f64),
}

/// One emitted segment, plus the stop it creates (if any)
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub action: Action,
    pub segment: DutySegment,
    pub stop: Option<Stop>,
}

/// Result of a full simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub segments: Vec<DutySegment>,
    pub stops: Vec<Stop>,
    pub total_distance_miles: f64,
    pub total_driving_hours: f64,
    pub end_time: NaiveDateTime,
    pub path: Vec<Coordinates>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

fn duration_to_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

/// Point `offset` path points past the cursor, clamped to the path end.
///
/// Positional, not distance-based: a path sampled unevenly puts the
/// waypoint only roughly where the stop happens.
fn waypoint(path: &[Coordinates], index: usize, offset: usize) -> Coordinates {
    let last = path.len().saturating_sub(1);
    path[(index + offset).min(last)]
}

fn driving_chunk(state: &SimState) -> f64 {
    (MAX_DRIVING_HOURS - state.driving_today)
        .min(state.window_left())
        .min(state.remaining_driving_hours)
        .min(BREAK_AFTER_DRIVING_HOURS - state.driving_since_break)
        .min(CYCLE_LIMIT_HOURS - state.cycle_hours)
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Decide the next transition. `None` once the dropoff has been emitted.
pub fn next_action(state: &SimState, ctx: &TripContext) -> Option<Action> {
    match state.phase {
        Phase::AtOrigin => return Some(Action::Pickup),
        Phase::Arrived => return None,
        Phase::EnRoute => {}
    }

    if state.cycle_hours >= CYCLE_LIMIT_HOURS - EPSILON_HOURS {
        return Some(Action::Restart);
    }
    if state.remaining_driving_hours <= EPSILON_HOURS {
        if state.hours_in_window() + SERVICE_HOURS > ON_DUTY_WINDOW_HOURS + EPSILON_HOURS {
            return Some(Action::DailyReset);
        }
        return Some(Action::Dropoff);
    }

    let in_window = state.hours_in_window();
    let window_left = state.window_left();
    let available = (MAX_DRIVING_HOURS - state.driving_today)
        .min(window_left)
        .min(state.remaining_driving_hours);

    if available <= EPSILON_HOURS || in_window >= ON_DUTY_WINDOW_HOURS {
        return Some(Action::DailyReset);
    }

    if state.driving_since_break >= BREAK_AFTER_DRIVING_HOURS - EPSILON_HOURS {
        // A break that leaves no time to drive is pointless; rest instead.
        if window_left - BREAK_HOURS <= EPSILON_HOURS {
            return Some(Action::DailyReset);
        }
        return Some(Action::Break);
    }

    let chunk = driving_chunk(state);
    if !state.refueled {
        let projected = state.miles_since_fuel + ctx.route.average_speed_mph() * chunk;
        if projected >= FUEL_INTERVAL_MILES {
            if window_left - FUEL_STOP_HOURS <= EPSILON_HOURS {
                return Some(Action::DailyReset);
            }
            return Some(Action::FuelStop);
        }
    }

    Some(Action::Drive(chunk))
}

/// Perform `action` on a copy of `state`
pub fn apply(state: &SimState, ctx: &TripContext, action: Action) -> (SimState, Transition) {
    let mut next = state.clone();
    let path = ctx.route.path();
    let n = path.len();

    let (status, hours, reason, stop) = match action {
        Action::Pickup => {
            let reason = format!("Loading at {}", ctx.pickup_label);
            next.phase = Phase::EnRoute;
            let stop = Stop {
                stop_type: StopType::Pickup,
                location: ctx.pickup,
                duration_hours: SERVICE_HOURS,
                reason: reason.clone(),
            };
            (DutyStatus::OnDutyNotDriving, SERVICE_HOURS, Some(reason), Some(stop))
        }
        Action::Dropoff => {
            let reason = format!("Unloading at {}", ctx.dropoff_label);
            next.phase = Phase::Arrived;
            let stop = Stop {
                stop_type: StopType::Dropoff,
                location: ctx.dropoff,
                duration_hours: SERVICE_HOURS,
                reason: reason.clone(),
            };
            (DutyStatus::OnDutyNotDriving, SERVICE_HOURS, Some(reason), Some(stop))
        }
        Action::DailyReset => {
            let stop = Stop {
                stop_type: StopType::Rest,
                location: waypoint(path, state.path_index, n / 4),
                duration_hours: DAILY_RESET_HOURS,
                reason: "Daily reset".to_string(),
            };
            (DutyStatus::OffDuty, DAILY_RESET_HOURS, Some("10-hour reset".to_string()), Some(stop))
        }
        Action::Restart => {
            let stop = Stop {
                stop_type: StopType::Restart,
                location: path[n - 1],
                duration_hours: RESTART_HOURS,
                reason: "70-hour restart".to_string(),
            };
            (DutyStatus::OffDuty, RESTART_HOURS, Some("34-hour restart".to_string()), Some(stop))
        }
        Action::Break => {
            (DutyStatus::OnDutyNotDriving, BREAK_HOURS, Some("30-min break".to_string()), None)
        }
        Action::FuelStop => {
            let stop = Stop {
                stop_type: StopType::Fuel,
                location: waypoint(path, state.path_index, n / 3),
                duration_hours: FUEL_STOP_HOURS,
                reason: "Fuel stop".to_string(),
            };
            (DutyStatus::OnDutyNotDriving, FUEL_STOP_HOURS, Some("Fuel stop".to_string()), Some(stop))
        }
        Action::Drive(hours) => (DutyStatus::Driving, hours, None, None),
    };

    let segment = DutySegment {
        day: state.day,
        start: state.clock,
        end: state.clock + hours_to_duration(hours),
        status,
        reason,
    };
    next.clock = segment.end;

    if status.is_on_duty() {
        next.on_duty_today += hours;
        next.cycle_hours += hours;
    }

    match action {
        Action::DailyReset => {
            next.window_start = next.clock;
            next.driving_today = 0.0;
            next.on_duty_today = 0.0;
            next.day += 1;
        }
        Action::Restart => {
            // Daily counters are left to the next 10h reset
            next.window_start = next.clock;
            next.cycle_hours = 0.0;
            next.day += 2;
        }
        Action::Break => {
            next.driving_since_break = 0.0;
        }
        Action::FuelStop => {
            next.refueled = true;
        }
        Action::Drive(hours) => {
            next.driving_today += hours;
            next.driving_since_break += hours;
            next.remaining_driving_hours -= hours;

            let miles = ctx.route.average_speed_mph() * hours;
            next.miles_since_fuel = if state.refueled {
                (state.miles_since_fuel + miles) % FUEL_INTERVAL_MILES
            } else {
                state.miles_since_fuel + miles
            };
            next.refueled = false;

            let divisor = (ctx.route.total_driving_hours() / hours).floor().max(1.0) as usize;
            next.path_index = (state.path_index + n / divisor).min(n - 1);
        }
        Action::Pickup | Action::Dropoff => {}
    }

    (next, Transition { action, segment, stop })
}

/// One pure step of the state machine
pub fn step(state: &SimState, ctx: &TripContext) -> Option<(SimState, Transition)> {
    next_action(state, ctx).map(|action| apply(state, ctx, action))
}

/// Simulate the whole trip from pickup to dropoff.
///
/// Fails only on unusable input: an empty path or a non-positive driving
/// duration on the route, or a negative cycle balance.
pub fn simulate(
    start_time: NaiveDateTime,
    starting_cycle_hours: f64,
    ctx: &TripContext,
) -> PlanResult<Simulation> {
    let route = ctx.route;
    if route.path().is_empty() {
        return Err(PlanError::invalid("route path is empty"));
    }
    if !route.total_driving_hours().is_finite() || route.total_driving_hours() <= 0.0 {
        return Err(PlanError::invalid(format!(
            "route driving hours must be positive, got {}",
            route.total_driving_hours()
        )));
    }
    if !starting_cycle_hours.is_finite() || starting_cycle_hours < 0.0 {
        return Err(PlanError::invalid(format!(
            "starting cycle hours must be non-negative, got {}",
            starting_cycle_hours
        )));
    }

    debug!(
        "Simulating {:.1} mi / {:.2} h from {} with {:.1} cycle hours used",
        route.total_distance_miles(),
        route.total_driving_hours(),
        start_time,
        starting_cycle_hours
    );

    let mut state = SimState::new(start_time, starting_cycle_hours, route);
    let mut segments = Vec::new();
    let mut stops = Vec::new();

    while let Some((next, transition)) = step(&state, ctx) {
        trace!(
            "day {} {:?} ({}): {} -> {}",
            transition.segment.day,
            transition.action,
            transition.segment.status.as_str(),
            transition.segment.start,
            transition.segment.end
        );
        segments.push(transition.segment);
        stops.extend(transition.stop);
        state = next;
    }

    debug!(
        "Simulation finished: {} segments, {} stops, arrival {}",
        segments.len(),
        stops.len(),
        state.clock
    );

    Ok(Simulation {
        segments,
        stops,
        total_distance_miles: route.total_distance_miles(),
        total_driving_hours: route.total_driving_hours(),
        end_time: state.clock,
        path: route.path().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TOL: f64 = 1e-3;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 27).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    /// Straight path of `points` evenly spaced points
    fn route(miles: f64, hours: f64, points: usize) -> RouteSummary {
        let path = (0..points)
            .map(|i| Coordinates::new(40.0 - i as f64 * 0.1, -100.0 + i as f64 * 0.1))
            .collect();
        RouteSummary::new(miles, hours, path).unwrap()
    }

    fn ctx(route: &RouteSummary) -> TripContext<'_> {
        TripContext {
            route,
            pickup: Coordinates::new(40.0, -100.0),
            dropoff: Coordinates::new(35.0, -95.0),
            pickup_label: "Denver, CO",
            dropoff_label: "Dallas, TX",
        }
    }

    fn run(route: &RouteSummary, cycle: f64) -> Simulation {
        simulate(start(), cycle, &ctx(route)).unwrap()
    }

    fn reasons(sim: &Simulation) -> Vec<&str> {
        sim.segments.iter().map(|s| s.reason_or_empty()).collect()
    }

    fn driving_hours(sim: &Simulation) -> Vec<f64> {
        sim.segments
            .iter()
            .filter(|s| s.status == DutyStatus::Driving)
            .map(|s| s.hours())
            .collect()
    }

    fn assert_within_window(seg: &DutySegment, window_start: NaiveDateTime) {
        let window = duration_to_hours(seg.end - window_start);
        assert!(window <= ON_DUTY_WINDOW_HOURS + TOL, "on duty past the window ({window}): {:?}", seg);
    }

    /// Checks every regulatory property on a finished simulation
    fn assert_hos_invariants(sim: &Simulation, starting_cycle: f64) {
        let mut window_start = sim.segments[0].start;
        let mut since_break = 0.0;
        let mut cycle = starting_cycle;

        for pair in sim.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "segments must be contiguous");
        }

        for seg in &sim.segments {
            assert!(seg.end > seg.start, "empty segment {:?}", seg);
            let hours = seg.hours();
            match seg.status {
                DutyStatus::Driving => {
                    assert!(hours <= MAX_DRIVING_HOURS + TOL);
                    assert!(cycle < CYCLE_LIMIT_HOURS, "driving with exhausted cycle ({cycle})");
                    assert_within_window(seg, window_start);
                    since_break += hours;
                    assert!(since_break <= BREAK_AFTER_DRIVING_HOURS + TOL);
                    cycle += hours;
                }
                DutyStatus::OnDutyNotDriving => {
                    assert_within_window(seg, window_start);
                    if seg.reason_or_empty() == "30-min break" {
                        since_break = 0.0;
                    }
                    cycle += hours;
                }
                DutyStatus::OffDuty => {
                    window_start = seg.end;
                    if (hours - RESTART_HOURS).abs() < TOL {
                        cycle = 0.0;
                    }
                }
                DutyStatus::SleeperBerth => unreachable!("simulator never emits sleeper berth"),
            }
        }
    }

    #[test]
    fn short_trip_has_no_insertions() {
        let route = route(300.0, 5.0, 2);
        let sim = run(&route, 0.0);

        assert_eq!(sim.segments.len(), 3);
        assert_eq!(reasons(&sim), vec!["Loading at Denver, CO", "", "Unloading at Dallas, TX"]);
        assert_eq!(driving_hours(&sim), vec![5.0]);
        assert_eq!(sim.segments[0].hours(), 1.0);
        assert_eq!(sim.segments[2].hours(), 1.0);
        assert_eq!(sim.end_time, start() + Duration::hours(7));

        let types: Vec<_> = sim.stops.iter().map(|s| s.stop_type).collect();
        assert_eq!(types, vec![StopType::Pickup, StopType::Dropoff]);
        assert_eq!(sim.stops[0].location, Coordinates::new(40.0, -100.0));
        assert_eq!(sim.stops[1].location, Coordinates::new(35.0, -95.0));
    }

    #[test]
    fn twelve_hour_trip_breaks_after_eight_hours_of_driving() {
        let route = route(720.0, 12.0, 20);
        let sim = run(&route, 0.0);

        let breaks: Vec<_> = sim
            .segments
            .iter()
            .filter(|s| s.reason_or_empty() == "30-min break")
            .collect();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].hours(), 0.5);
        // 1h pickup + 8h driving
        assert_eq!(breaks[0].start, start() + Duration::hours(9));

        let drives = driving_hours(&sim);
        assert_eq!(drives[0], 8.0);
        let after_break: f64 = drives[1..].iter().sum();
        assert!((after_break - 4.0).abs() < TOL);

        // 11h daily limit forces a reset before the last hour
        assert_eq!(drives, vec![8.0, 3.0, 1.0]);
        assert!(reasons(&sim).contains(&"10-hour reset"));
        assert_hos_invariants(&sim, 0.0);
    }

    #[test]
    fn exhausted_cycle_inserts_restart_before_driving() {
        let route = route(120.0, 2.0, 5);
        let sim = run(&route, 69.0);

        assert_eq!(
            reasons(&sim),
            vec!["Loading at Denver, CO", "34-hour restart", "", "Unloading at Dallas, TX"]
        );
        let restart = &sim.segments[1];
        assert_eq!(restart.status, DutyStatus::OffDuty);
        assert_eq!(restart.hours(), 34.0);
        assert_eq!(restart.day, 1);
        assert_eq!(sim.segments[2].day, 3);

        let restart_stop = sim.stops.iter().find(|s| s.stop_type == StopType::Restart).unwrap();
        assert_eq!(restart_stop.location, *route.path().last().unwrap());
        assert_eq!(restart_stop.duration_hours, 34.0);
        assert_hos_invariants(&sim, 69.0);
    }

    #[test]
    fn restart_after_driving_reaches_cycle_limit() {
        // 1h pickup + 4h driving takes 65 to 70 exactly
        let route = route(240.0, 4.0, 5);
        let sim = run(&route, 65.0);

        assert_eq!(
            reasons(&sim),
            vec!["Loading at Denver, CO", "", "34-hour restart", "Unloading at Dallas, TX"]
        );
    }

    #[test]
    fn driving_is_capped_at_cycle_limit() {
        let route = route(600.0, 10.0, 10);
        let sim = run(&route, 66.0);

        // 67 after pickup leaves 3h before the restart
        let drives = driving_hours(&sim);
        assert_eq!(drives[0], 3.0);
        assert_eq!(sim.segments[2].reason_or_empty(), "34-hour restart");
        assert_hos_invariants(&sim, 66.0);
    }

    #[test]
    fn fuel_stop_precedes_chunk_crossing_thousand_miles() {
        let route = route(1200.0, 20.0, 10);
        let sim = run(&route, 0.0);

        let fuel: Vec<_> = sim.stops.iter().filter(|s| s.stop_type == StopType::Fuel).collect();
        assert_eq!(fuel.len(), 1);
        assert_eq!(fuel[0].duration_hours, 0.5);
        // Cursor sits at index 8 after three chunks; 8 + 10/3 clamps to the end.
        assert_eq!(fuel[0].location, route.path()[9]);

        let idx = sim.segments.iter().position(|s| s.reason_or_empty() == "Fuel stop").unwrap();
        assert_eq!(sim.segments[idx].status, DutyStatus::OnDutyNotDriving);
        assert_eq!(sim.segments[idx + 1].status, DutyStatus::Driving);

        let rest: Vec<_> = sim.stops.iter().filter(|s| s.stop_type == StopType::Rest).collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].location, route.path()[8]);
        assert_eq!(rest[0].duration_hours, 10.0);

        let total: f64 = driving_hours(&sim).iter().sum();
        assert!((total - 20.0).abs() < TOL);
        assert_hos_invariants(&sim, 0.0);
    }

    #[test]
    fn day_counter_advances_per_rest() {
        let route = route(1500.0, 25.0, 30);
        let sim = run(&route, 0.0);

        let mut expected_day = 1;
        for seg in &sim.segments {
            assert_eq!(seg.day, expected_day);
            if seg.reason_or_empty() == "10-hour reset" {
                expected_day += 1;
            } else if seg.reason_or_empty() == "34-hour restart" {
                expected_day += 2;
            }
        }
        assert!(expected_day > 1);
    }

    #[test]
    fn invariants_hold_across_trip_shapes() {
        let durations = [0.25, 5.0, 8.0, 11.0, 12.0, 13.9, 14.0, 25.0, 47.3, 80.0];
        let cycles = [0.0, 35.5, 60.0, 69.0, 69.9, 75.0];
        for &hours in &durations {
            for &cycle in &cycles {
                let route = route(hours * 62.0, hours, 50);
                let sim = run(&route, cycle);
                assert_hos_invariants(&sim, cycle);

                let total: f64 = driving_hours(&sim).iter().sum();
                assert!((total - hours).abs() < TOL, "drove {total} of {hours}");
                assert_eq!(sim.stops.first().unwrap().stop_type, StopType::Pickup);
                assert_eq!(sim.stops.last().unwrap().stop_type, StopType::Dropoff);
                assert_eq!(sim.end_time, sim.segments.last().unwrap().end);
            }
        }
    }

    #[test]
    fn simulation_is_deterministic() {
        let route = route(2800.0, 47.3, 120);
        let a = run(&route, 42.0);
        let b = run(&route, 42.0);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_path_is_rejected() {
        let route = RouteSummary::unchecked(10.0, 1.0, vec![]);
        let err = simulate(start(), 0.0, &ctx(&route)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(_)));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let route = RouteSummary::unchecked(10.0, 0.0, vec![Coordinates::new(1.0, 2.0)]);
        assert!(simulate(start(), 0.0, &ctx(&route)).is_err());
    }

    #[test]
    fn negative_cycle_is_rejected() {
        let route = route(100.0, 2.0, 2);
        assert!(simulate(start(), -0.5, &ctx(&route)).is_err());
    }

    // -----------------------------------------------------------------------
    // Single transitions
    // -----------------------------------------------------------------------

    fn en_route(route: &RouteSummary) -> SimState {
        let mut state = SimState::new(start(), 0.0, route);
        state.phase = Phase::EnRoute;
        state
    }

    #[test]
    fn first_step_is_pickup() {
        let route = route(100.0, 2.0, 2);
        let state = SimState::new(start(), 10.0, &route);
        let (next, transition) = step(&state, &ctx(&route)).unwrap();

        assert_eq!(transition.action, Action::Pickup);
        assert_eq!(next.phase, Phase::EnRoute);
        assert_eq!(next.cycle_hours, 11.0);
        assert_eq!(next.clock, start() + Duration::hours(1));
        assert_eq!(next.window_start, start());
    }

    #[test]
    fn exhausted_window_resets() {
        let route = route(600.0, 10.0, 8);
        let mut state = en_route(&route);
        state.window_start = start() - Duration::hours(14);
        state.driving_today = 6.0;
        state.path_index = 3;

        let (next, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::DailyReset);
        assert_eq!(transition.segment.status, DutyStatus::OffDuty);
        assert_eq!(next.day, 2);
        assert_eq!(next.driving_today, 0.0);
        assert_eq!(next.window_start, next.clock);
        // 3 + 8/4
        assert_eq!(transition.stop.unwrap().location, route.path()[5]);
    }

    #[test]
    fn eight_hours_since_break_takes_break() {
        let route = route(600.0, 10.0, 8);
        let mut state = en_route(&route);
        state.window_start = start() - Duration::hours(9);
        state.driving_today = 8.0;
        state.driving_since_break = 8.0;

        let (next, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Break);
        assert!(transition.stop.is_none());
        assert_eq!(next.driving_since_break, 0.0);
        assert_eq!(next.cycle_hours, 0.5);
        assert_eq!(next.remaining_driving_hours, 10.0);
    }

    #[test]
    fn break_without_room_to_drive_becomes_reset() {
        let route = route(600.0, 10.0, 8);
        let mut state = en_route(&route);
        state.window_start = start() - Duration::minutes(13 * 60 + 45);
        state.driving_today = 8.0;
        state.driving_since_break = 8.0;

        assert_eq!(next_action(&state, &ctx(&route)), Some(Action::DailyReset));
    }

    #[test]
    fn drive_after_fuel_stop_wraps_mileage() {
        let route = route(600.0, 10.0, 8);
        let mut state = en_route(&route);
        state.miles_since_fuel = 900.0;

        let (fueled, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::FuelStop);
        assert!(fueled.refueled);

        let (driven, transition) = step(&fueled, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Drive(8.0));
        // 900 + 60 mph * 8h = 1380
        assert!((driven.miles_since_fuel - 380.0).abs() < 1e-9);
        assert!(!driven.refueled);
    }

    #[test]
    fn drive_advances_path_cursor() {
        let route = route(600.0, 10.0, 40);
        let state = en_route(&route);

        let (next, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Drive(8.0));
        // floor(10 / 8) = 1, so the cursor jumps the whole path (clamped)
        assert_eq!(next.path_index, 39);
        assert_eq!(next.remaining_driving_hours, 2.0);
        assert_eq!(next.driving_today, 8.0);
    }

    #[test]
    fn arrived_state_has_no_further_steps() {
        let route = route(100.0, 2.0, 2);
        let mut state = en_route(&route);
        state.remaining_driving_hours = 0.0;

        let (next, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Dropoff);
        assert_eq!(next.phase, Phase::Arrived);
        assert!(step(&next, &ctx(&route)).is_none());
    }

    #[test]
    fn restart_keeps_daily_driving_counters() {
        let route = route(1800.0, 30.0, 12);
        let mut state = en_route(&route);
        state.window_start = start() - Duration::hours(10);
        state.driving_today = 8.5;
        state.on_duty_today = 10.0;
        state.driving_since_break = 0.5;
        state.cycle_hours = 70.0;

        let (next, transition) = step(&state, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Restart);
        assert_eq!(next.cycle_hours, 0.0);
        assert_eq!(next.window_start, next.clock);
        assert_eq!(next.day, 3);
        assert_eq!(next.driving_today, 8.5);
        assert_eq!(next.on_duty_today, 10.0);

        // Only 11 - 8.5 hours of driving remain before the next reset
        let (_, transition) = step(&next, &ctx(&route)).unwrap();
        assert_eq!(transition.action, Action::Drive(2.5));
    }

    #[test]
    fn restart_mid_trip_limits_driving_until_reset() {
        let route = route(1800.0, 30.0, 12);
        let sim = run(&route, 60.0);

        let restart = sim
            .segments
            .iter()
            .position(|s| s.reason_or_empty() == "34-hour restart")
            .unwrap();
        let driven_before_reset: f64 = sim.segments[restart..]
            .iter()
            .take_while(|s| s.reason_or_empty() != "10-hour reset")
            .filter(|s| s.status == DutyStatus::Driving)
            .map(|s| s.hours())
            .sum();
        let driven_before_restart: f64 = sim.segments[..restart]
            .iter()
            .filter(|s| s.status == DutyStatus::Driving)
            .map(|s| s.hours())
            .sum();

        assert!((driven_before_restart + driven_before_reset - MAX_DRIVING_HOURS).abs() < TOL);
        assert_hos_invariants(&sim, 60.0);
    }

    #[test]
    fn dropoff_past_window_waits_for_reset() {
        // 190 mph forces two fuel stops into the first window
        let route = route(2090.0, 11.0, 10);
        let sim = run(&route, 0.0);

        assert_eq!(
            reasons(&sim),
            vec![
                "Loading at Denver, CO",
                "Fuel stop",
                "",
                "30-min break",
                "Fuel stop",
                "",
                "10-hour reset",
                "Unloading at Dallas, TX",
            ]
        );
        assert_hos_invariants(&sim, 0.0);
    }

    #[test]
    fn dropoff_that_fits_the_window_is_immediate() {
        let route = route(100.0, 2.0, 2);
        let mut state = en_route(&route);
        state.window_start = start() - Duration::hours(13);
        state.remaining_driving_hours = 0.0;

        assert_eq!(next_action(&state, &ctx(&route)), Some(Action::Dropoff));

        state.window_start = start() - Duration::minutes(13 * 60 + 1);
        assert_eq!(next_action(&state, &ctx(&route)), Some(Action::DailyReset));
    }
}
