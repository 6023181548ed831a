//! Address → coordinates lookup.
//!
//! [`MapQuestGeocoder`] calls the MapQuest Geocoding API v1. [`StaticGeocoder`]
//! answers from a fixed table and backs tests and key-less development runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use devcamp_bootcamps::Location;
use devcamp_core::GeoPoint;

const MAPQUEST_BASE_URL: &str = "https://www.mapquestapi.com";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {0}")]
    Status(u16),

    #[error("geocoder response could not be read: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `address`, or `None` when the provider has no result.
    async fn geocode(&self, address: &str) -> Result<Option<Location>, GeocodeError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// MapQuest
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: MapQuestLatLng,
    #[serde(default)]
    street: String,
    /// City.
    #[serde(default)]
    admin_area5: String,
    /// State.
    #[serde(default)]
    admin_area3: String,
    /// Country code.
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

pub struct MapQuestGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, MAPQUEST_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("devcamp-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    #[instrument(skip(self), err)]
    async fn geocode(&self, address: &str) -> Result<Option<Location>, GeocodeError> {
        let url = format!("{}/geocoding/v1/address", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: MapQuestResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;
        let location = first_location(body)?;
        debug!(found = location.is_some(), "geocoded address");
        Ok(location)
    }
}

fn first_location(body: MapQuestResponse) -> Result<Option<Location>, GeocodeError> {
    let Some(hit) = body.results.into_iter().flat_map(|r| r.locations).next() else {
        return Ok(None);
    };

    let point = GeoPoint::new(hit.lat_lng.lng, hit.lat_lng.lat)
        .map_err(|e| GeocodeError::Decode(e.to_string()))?;

    let non_empty = |s: String| Some(s).filter(|s| !s.trim().is_empty());
    let street = non_empty(hit.street);
    let city = non_empty(hit.admin_area5);
    let state = non_empty(hit.admin_area3);
    let zipcode = non_empty(hit.postal_code);
    let country = non_empty(hit.admin_area1);

    let region = match (&state, &zipcode) {
        (Some(s), Some(z)) => Some(format!("{s} {z}")),
        (Some(s), None) => Some(s.clone()),
        (None, Some(z)) => Some(z.clone()),
        (None, None) => None,
    };
    let formatted = [street.clone(), city.clone(), region, country.clone()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let mut location = Location::at(point, formatted);
    location.street = street;
    location.city = city;
    location.state = state;
    location.zipcode = zipcode;
    location.country = country;
    Ok(Some(location))
}

// ─────────────────────────────────────────────────────────────────────────────
// Static table
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed address table. Lookups ignore surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, Location>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: impl Into<String>, location: Location) -> Self {
        self.entries.insert(address.into().trim().to_string(), location);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Location>, GeocodeError> {
        Ok(self.entries.get(address.trim()).cloned())
    }
}
