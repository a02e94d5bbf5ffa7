pub mod google;
pub mod mapbox;

use async_trait::async_trait;

use crate::models::{Coordinate, PlaceCategory, PlaceMatch};

pub use google::GooglePlacesClient;
pub use mapbox::MapboxClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("http transport error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    #[error("provider found no route")]
    NoRoute,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err)
        }
    }
}

/// Driving route as reported by the directions provider, before unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub coordinates: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// One nearby-search call against the places provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch<'a> {
    pub location: Coordinate,
    pub category: PlaceCategory,
    pub radius_meters: u32,
    pub keyword: Option<&'a str>,
}

/// Computes a driving route between two resolved coordinates.
///
/// # Contract
/// - `Err(ProviderError::NoRoute)` when the provider answers but has no route
/// - any other error means the call itself failed
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError>;
}

/// Searches points of interest around a coordinate.
///
/// # Contract
/// Results are ranked by the provider (rating/prominence); callers only
/// ever rely on the first element. An empty vector means "nothing found"
/// and is not an error.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn nearby_search(
        &self,
        search: NearbySearch<'_>,
    ) -> Result<Vec<PlaceMatch>, ProviderError>;
}

/// Resolves free text such as "Moab, UT" to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Fails on a non-success status, then decodes the body as JSON.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
