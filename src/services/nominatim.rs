//! Nominatim geocoding client

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::types::Coordinates;

/// Nominatim API response
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl NominatimResult {
    pub fn coordinates(&self) -> Result<Coordinates> {
        let lat: f64 = self.lat.parse().context("Invalid latitude")?;
        let lng: f64 = self.lon.parse().context("Invalid longitude")?;
        Ok(Coordinates { lat, lng })
    }
}

/// Nominatim geocoding client
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hos-planner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address)
        )
    }

    /// Geocode a free-form address to coordinates
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let url = self.search_url(address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Nominatim returned {} for '{}'", status, address);
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        match results.first() {
            Some(result) => {
                debug!("Geocoded '{}' to '{}'", address, result.display_name);
                Ok(Some(result.coordinates()?))
            }
            None => Ok(None),
        }
    }
}
