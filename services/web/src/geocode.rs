//! Best-effort reverse geocoding.
//!
//! A failed lookup never fails a report submission; the report is stored
//! without an address and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Default Mapbox API origin.
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com";

/// Source tag stored alongside geocoded addresses.
pub const MAPBOX_SOURCE: &str = "mapbox";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a reverse geocoding lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseGeocode {
    pub address: Option<String>,
    pub time_zone: Option<String>,
    /// HTTP status, if a response was received.
    pub status: Option<u16>,
    pub ok: bool,
}

/// Resolves coordinates into an address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Name stored as the report's address source.
    fn source(&self) -> &'static str;

    async fn reverse(&self, latitude: f64, longitude: f64) -> ReverseGeocode;
}

/// Mapbox geocoding v5 client.
#[derive(Clone)]
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(access_token: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(MAPBOX_BASE_URL, access_token)
    }

    /// Points the client at another origin (used by tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{longitude},{latitude}.json",
            self.base_url
        )
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    fn source(&self) -> &'static str {
        MAPBOX_SOURCE
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> ReverseGeocode {
        let response = match self
            .client
            .get(self.endpoint(latitude, longitude))
            .query(&[("access_token", self.access_token.as_str()), ("limit", "1")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocode request failed");
                return ReverseGeocode::default();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Reverse geocode returned an error status");
            return ReverseGeocode {
                status: Some(status.as_u16()),
                ..Default::default()
            };
        }

        let body: MapboxResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocode response was not valid JSON");
                return ReverseGeocode {
                    status: Some(status.as_u16()),
                    ..Default::default()
                };
            }
        };

        let feature = body.features.into_iter().next();
        ReverseGeocode {
            address: feature.as_ref().and_then(MapboxFeature::address),
            time_zone: feature.as_ref().and_then(MapboxFeature::time_zone),
            status: Some(status.as_u16()),
            ok: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Default, Deserialize)]
struct MapboxFeature {
    place_name: Option<String>,
    #[serde(default)]
    properties: MapboxProperties,
}

#[derive(Debug, Default, Deserialize)]
struct MapboxProperties {
    full_address: Option<String>,
    place_formatted: Option<String>,
    timezone: Option<String>,
    time_zone: Option<String>,
}

fn first_non_blank<'a>(candidates: impl IntoIterator<Item = &'a Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

impl MapboxFeature {
    fn address(&self) -> Option<String> {
        first_non_blank([
            &self.place_name,
            &self.properties.full_address,
            &self.properties.place_formatted,
        ])
    }

    fn time_zone(&self) -> Option<String> {
        first_non_blank([&self.properties.timezone, &self.properties.time_zone])
    }
}
