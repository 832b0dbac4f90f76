//! Configuration management

use std::time::Duration;

use anyhow::{Context, Result};

use crate::defaults::{
    DEFAULT_GEOCODER_BACKEND, DEFAULT_NATS_URL, DEFAULT_NOMINATIM_URL, DEFAULT_ROUTING_TIMEOUT_SECS,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// Optional NATS credentials
    pub nats_user: Option<String>,
    pub nats_password: Option<String>,

    /// OSRM routing engine URL (optional, falls back to mock if unavailable)
    pub osrm_url: Option<String>,

    /// Timeout for a single routing request, seconds
    pub routing_timeout_secs: u64,

    /// Nominatim API URL (for geocoding)
    pub nominatim_url: String,

    /// "nominatim" or "mock"
    pub geocoder_backend: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| DEFAULT_NATS_URL.to_string());

        let nats_user = non_empty_var("NATS_USER");
        let nats_password = non_empty_var("NATS_PASSWORD");

        let osrm_url = non_empty_var("OSRM_URL");

        let routing_timeout_secs = match std::env::var("ROUTING_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("ROUTING_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))?,
            Err(_) => DEFAULT_ROUTING_TIMEOUT_SECS,
        };

        let nominatim_url =
            std::env::var("NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string());

        let geocoder_backend = std::env::var("GEOCODER_BACKEND")
            .unwrap_or_else(|_| DEFAULT_GEOCODER_BACKEND.to_string())
            .to_lowercase();

        Ok(Self {
            nats_url,
            nats_user,
            nats_password,
            osrm_url,
            routing_timeout_secs,
            nominatim_url,
            geocoder_backend,
        })
    }

    pub fn routing_timeout(&self) -> Duration {
        Duration::from_secs(self.routing_timeout_secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
