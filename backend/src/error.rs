use thiserror::Error;

use crate::providers::ProviderError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("invalid trip parameter: {0}")]
    InvalidParameter(String),
    #[error("could not find a location for '{0}'")]
    LocationNotFound(String),
    #[error("geocoding failed: {0}")]
    Geocode(#[source] ProviderError),
    #[error("could not plan route: {0}")]
    Directions(#[source] ProviderError),
    #[error("places search failed: {0}")]
    Places(#[source] ProviderError),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}
