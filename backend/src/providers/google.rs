use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{NearbySearch, PlacesProvider, ProviderError, http_client, read_json};
use crate::models::{Coordinate, PlaceCategory, PlaceMatch};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Google Places nearby-search client.
///
/// The top-ranked result is enriched with phone number and website through
/// a details lookup; a failed details call leaves those fields empty.
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Deserialize)]
struct NearbyResult {
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    geometry: ResultGeometry,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Deserialize)]
struct ResultGeometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
}

fn place_type(category: PlaceCategory) -> &'static str {
    match category {
        PlaceCategory::GasStation => "gas_station",
        PlaceCategory::Lodging => "lodging",
        PlaceCategory::Restaurant => "restaurant",
        PlaceCategory::Campground => "campground",
        PlaceCategory::Attraction => "tourist_attraction",
    }
}

impl From<NearbyResult> for PlaceMatch {
    fn from(result: NearbyResult) -> Self {
        PlaceMatch {
            name: result.name,
            address: result.vicinity.unwrap_or_default(),
            location: Coordinate {
                lat: result.geometry.location.lat,
                lon: result.geometry.location.lng,
            },
            rating: result.rating,
            website: None,
            phone_number: None,
            category_tags: result.types,
        }
    }
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/details/json", self.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", "formatted_phone_number,website"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let body: DetailsResponse = read_json(response).await?;
        if body.status != "OK" {
            return Ok(None);
        }
        Ok(body.result)
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn nearby_search(
        &self,
        search: NearbySearch<'_>,
    ) -> Result<Vec<PlaceMatch>, ProviderError> {
        let location = format!("{},{}", search.location.lat, search.location.lon);
        let radius = search.radius_meters.to_string();
        let mut query = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("type", place_type(search.category)),
            ("key", self.api_key.as_str()),
        ];
        if let Some(keyword) = search.keyword {
            query.push(("keyword", keyword));
        }

        let response = self
            .http
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&query)
            .send()
            .await?;
        let body: NearbyResponse = read_json(response).await?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            status => {
                return Err(ProviderError::Rejected(
                    body.error_message.unwrap_or_else(|| status.to_string()),
                ));
            }
        }

        let top_place_id = body.results.first().and_then(|r| r.place_id.clone());
        let mut places: Vec<PlaceMatch> = body.results.into_iter().map(PlaceMatch::from).collect();

        if let (Some(place_id), Some(top)) = (top_place_id, places.first_mut()) {
            match self.details(&place_id).await {
                Ok(Some(details)) => {
                    top.phone_number = details.formatted_phone_number;
                    top.website = details.website;
                }
                Ok(None) => {}
                Err(err) => tracing::warn!("place details lookup failed for {place_id}: {err}"),
            }
        }

        Ok(places)
    }
}
