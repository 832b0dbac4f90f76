use chrono::{Local, NaiveDateTime, Timelike};

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_BACKEND: &str = "nominatim";
pub const DEFAULT_ROUTING_TIMEOUT_SECS: u64 = 10;

/// Trip start when the caller gives none: local wall-clock now, to the second
pub fn default_start_time() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
