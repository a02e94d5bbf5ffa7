use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{DirectionsProvider, Geocoder, ProviderError, ProviderRoute, http_client, read_json};
use crate::models::Coordinate;

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Mapbox Directions + Geocoding client.
#[derive(Clone)]
pub struct MapboxClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    geometry: LineString,
    distance: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Deserialize)]
struct GeocodingFeature {
    center: [f64; 2],
}

impl MapboxClient {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(timeout)?,
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn directions_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/directions/v5/mapbox/driving/{},{};{},{}",
            self.base_url, origin.lon, origin.lat, destination.lon, destination.lat
        )
    }

    fn geocoding_url(&self, query: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/geocoding/v5/mapbox.places", self.base_url))
            .map_err(|e| ProviderError::Rejected(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Rejected("base url cannot carry a path".into()))?
            .push(&format!("{query}.json"));
        Ok(url)
    }
}

#[async_trait]
impl DirectionsProvider for MapboxClient {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError> {
        let response = self
            .http
            .get(self.directions_url(origin, destination))
            .query(&[
                ("geometries", "geojson"),
                ("overview", "full"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;
        let body: DirectionsResponse = read_json(response).await?;

        match body.code.as_str() {
            "Ok" => {}
            "NoRoute" | "NoSegment" => return Err(ProviderError::NoRoute),
            other => {
                return Err(ProviderError::Rejected(
                    body.message.unwrap_or_else(|| other.to_string()),
                ));
            }
        }

        let route = body.routes.into_iter().next().ok_or(ProviderError::NoRoute)?;
        tracing::debug!(
            "mapbox route: {} coordinates, {:.0} m, {:.0} s",
            route.geometry.coordinates.len(),
            route.distance,
            route.duration
        );

        Ok(ProviderRoute {
            coordinates: route
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from_lon_lat)
                .collect(),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

#[async_trait]
impl Geocoder for MapboxClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, ProviderError> {
        let response = self
            .http
            .get(self.geocoding_url(query)?)
            .query(&[("limit", "1"), ("access_token", self.access_token.as_str())])
            .send()
            .await?;
        let body: GeocodingResponse = read_json(response).await?;
        Ok(body
            .features
            .into_iter()
            .next()
            .map(|feature| Coordinate::from_lon_lat(feature.center)))
    }
}
