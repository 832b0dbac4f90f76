//! Geocoding abstraction layer
//!
//! Only consulted when a trip location arrives without coordinates.
//!
//! Configuration via GEOCODER_BACKEND env variable:
//! - "nominatim" → RateLimitedNominatimGeocoder (default)
//! - "mock" → MockGeocoder (tests, offline development)

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::services::nominatim::NominatimClient;
use crate::types::Coordinates;

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode a free-form address.
    /// Returns None if the address cannot be geocoded
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

// ==========================================================================
// MockGeocoder Implementation
// ==========================================================================

/// Mock geocoder for testing - returns deterministic fake coordinates
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic coordinates inside the contiguous United States
    fn hash_to_coordinates(address: &str) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        address.trim().to_lowercase().hash(&mut hasher);
        let hash = hasher.finish();

        const LAT_MIN: f64 = 31.0;
        const LAT_MAX: f64 = 46.0;
        const LNG_MIN: f64 = -118.0;
        const LNG_MAX: f64 = -76.0;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFF_FFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + lat_normalized * (LAT_MAX - LAT_MIN),
            lng: LNG_MIN + lng_normalized * (LNG_MAX - LNG_MIN),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        if address.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::hash_to_coordinates(address)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================================================
// RateLimiter Implementation
// ==========================================================================

/// Rate limiter that enforces minimum interval between calls
pub struct RateLimiter {
    last_call: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until it's safe to make another call
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ==========================================================================
// RateLimitedNominatimGeocoder Implementation
// ==========================================================================

/// Public Nominatim allows 1 req/s
const DEFAULT_RATE_LIMIT_MS: u64 = 1500;

/// Nominatim client behind a rate limiter
pub struct RateLimitedNominatimGeocoder {
    client: NominatimClient,
    rate_limiter: RateLimiter,
}

impl RateLimitedNominatimGeocoder {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_interval(base_url, Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    pub fn with_interval(base_url: &str, interval: Duration) -> Result<Self> {
        Ok(Self {
            client: NominatimClient::new(base_url)?,
            rate_limiter: RateLimiter::new(interval),
        })
    }
}

#[async_trait]
impl Geocoder for RateLimitedNominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        self.rate_limiter.wait().await;

        self.client.geocode(address).await.map_err(|e| {
            tracing::error!("Geocoding failed: {}", e);
            e
        })
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create the geocoder named by `backend` ("nominatim" or "mock")
pub fn create_geocoder(backend: &str, nominatim_url: &str) -> Result<Box<dyn Geocoder>> {
    match backend {
        "mock" => {
            info!("Using MockGeocoder");
            Ok(Box::new(MockGeocoder::new()))
        }
        "nominatim" => {
            info!("Using RateLimitedNominatimGeocoder at {}", nominatim_url);
            Ok(Box::new(RateLimitedNominatimGeocoder::new(nominatim_url)?))
        }
        other => {
            warn!("Unknown GEOCODER_BACKEND '{}', using nominatim", other);
            Ok(Box::new(RateLimitedNominatimGeocoder::new(nominatim_url)?))
        }
    }
}
