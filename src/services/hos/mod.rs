//! Hours-of-Service planning core
//!
//! Pure, synchronous computation: a route plus trip parameters go in, a
//! self-contained `Plan` comes out. No I/O and no state survives a call.
//!
//! Pipeline: `simulator` (duty segments + stops) -> `daily_log` (per-date
//! records) and `summary` (trip totals) -> `plan` (assembly).

pub mod daily_log;
pub mod plan;
pub mod simulator;
pub mod summary;

pub use daily_log::build_logs;
pub use plan::{assemble_plan, plan_trip, TripParams};
pub use simulator::{simulate, Simulation, TripContext};
pub use summary::build_summary;

// Regulatory limits. Fixed policy, not configurable.

/// Max driving hours per duty period
pub const MAX_DRIVING_HOURS: f64 = 11.0;
/// On-duty window after which driving stops until a daily reset
pub const ON_DUTY_WINDOW_HOURS: f64 = 14.0;
/// Cumulative driving that requires a break
pub const BREAK_AFTER_DRIVING_HOURS: f64 = 8.0;
pub const BREAK_HOURS: f64 = 0.5;
pub const DAILY_RESET_HOURS: f64 = 10.0;
/// 70-hour / 8-day cycle
pub const CYCLE_LIMIT_HOURS: f64 = 70.0;
pub const RESTART_HOURS: f64 = 34.0;
/// Pickup and dropoff service time each
pub const SERVICE_HOURS: f64 = 1.0;
pub const FUEL_INTERVAL_MILES: f64 = 1000.0;
pub const FUEL_STOP_HOURS: f64 = 0.5;

/// Tolerance for hour comparisons (3.6 ms)
pub const EPSILON_HOURS: f64 = 1e-6;

/// Clock-time format used in logs and the timeline
pub const CLOCK_FORMAT: &str = "%H:%M";

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
