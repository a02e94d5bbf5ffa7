use std::sync::Arc;

use crate::error::PlannerError;
use crate::geo::{METERS_PER_MILE, route_geometry, sort_by_distance};
use crate::gpx_export::encode_plan_as_gpx;
use crate::models::{
    Coordinate, NearbyRequest, NearbyResponse, PlanRequest, PlanResponse, RouteGeometry,
    StopLists, TripParameters,
};
use crate::providers::{DirectionsProvider, Geocoder, NearbySearch};
use crate::stops::StopPlanner;

/// Largest radius the places provider accepts for a nearby search.
const MAX_NEARBY_RADIUS_METERS: f64 = 50_000.0;

/// Shortest fuel range or daily distance a trip may ask for.
pub const MIN_CADENCE_MILES: f64 = 1.0;

/// Longest route accepted from a client; about once around the Earth.
pub const MAX_ROUTE_MILES: f64 = 25_000.0;

/// Rejects trip parameters no route could be planned with.
pub fn validate_trip(trip: &TripParameters) -> Result<(), PlannerError> {
    check_cadence("fuel_range_miles", trip.fuel_range_miles)?;
    check_cadence("miles_per_day", trip.miles_per_day)
}

fn check_cadence(field: &str, miles: f64) -> Result<(), PlannerError> {
    if miles.is_finite() && miles >= MIN_CADENCE_MILES {
        Ok(())
    } else {
        Err(PlannerError::InvalidParameter(format!(
            "{field} must be at least {MIN_CADENCE_MILES} mi, got {miles}"
        )))
    }
}

/// Rejects a client-supplied route whose geometry or length cannot be real.
pub fn validate_route(route: &RouteGeometry) -> Result<(), PlannerError> {
    let miles = route.total_distance_miles;
    if !(miles.is_finite() && (0.0..=MAX_ROUTE_MILES).contains(&miles)) {
        return Err(PlannerError::InvalidParameter(format!(
            "total_distance_miles must be between 0 and {MAX_ROUTE_MILES}, got {miles}"
        )));
    }
    for coord in &route.coordinates {
        validate_coordinate(*coord)?;
    }
    Ok(())
}

pub fn validate_coordinate(coord: Coordinate) -> Result<Coordinate, PlannerError> {
    if coord.is_valid() {
        Ok(coord)
    } else {
        Err(PlannerError::InvalidCoordinate {
            lat: coord.lat,
            lon: coord.lon,
        })
    }
}

/// Turns a trip form into a route plus stop lists.
pub struct TripPlanner {
    directions: Arc<dyn DirectionsProvider>,
    geocoder: Arc<dyn Geocoder>,
    stops: Arc<StopPlanner>,
}

impl TripPlanner {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        geocoder: Arc<dyn Geocoder>,
        stops: Arc<StopPlanner>,
    ) -> Self {
        Self {
            directions,
            geocoder,
            stops,
        }
    }

    pub async fn plan(&self, req: &PlanRequest) -> Result<PlanResponse, PlannerError> {
        validate_trip(&req.trip)?;
        let start = self.resolve_endpoint(req.start, &req.trip.start_point).await?;
        let end = self.resolve_endpoint(req.end, &req.trip.destination).await?;

        let route = self.route_between(start, end).await?;
        tracing::info!(
            "route {:?} -> {:?}: {:.1} mi, {:.1} h, {} points",
            start,
            end,
            route.total_distance_miles,
            route.total_duration_hours,
            route.coordinates.len()
        );

        let stops = self.stops.plan_all(&route, &req.trip).await;
        let gpx_base64 = encode_plan_as_gpx(&route, &stops)?;

        Ok(PlanResponse {
            route,
            stops,
            gpx_base64,
        })
    }

    /// Recomputes stop lists for an already planned route.
    pub async fn stops_for(
        &self,
        route: &RouteGeometry,
        trip: &TripParameters,
    ) -> Result<StopLists, PlannerError> {
        validate_trip(trip)?;
        validate_route(route)?;
        Ok(self.stops.plan_all(route, trip).await)
    }

    /// Every place the provider knows around `center`, closest first.
    pub async fn nearby(&self, req: &NearbyRequest) -> Result<NearbyResponse, PlannerError> {
        let center = validate_coordinate(req.center)?;
        if !(req.radius_miles.is_finite() && req.radius_miles > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "radius_miles must be positive, got {}",
                req.radius_miles
            )));
        }

        let radius_meters = (req.radius_miles * METERS_PER_MILE).min(MAX_NEARBY_RADIUS_METERS);
        let search = NearbySearch {
            location: center,
            category: req.category,
            radius_meters: radius_meters.round() as u32,
            keyword: req.keyword.as_deref(),
        };
        let places = self
            .stops
            .resolver()
            .provider()
            .nearby_search(search)
            .await
            .map_err(PlannerError::Places)?;

        Ok(NearbyResponse {
            places: sort_by_distance(center, places, req.radius_miles),
        })
    }

    async fn resolve_endpoint(
        &self,
        given: Option<Coordinate>,
        text: &str,
    ) -> Result<Coordinate, PlannerError> {
        if let Some(coord) = given {
            return validate_coordinate(coord);
        }
        let query = text.trim();
        if query.is_empty() {
            return Err(PlannerError::InvalidParameter(
                "start and destination need a coordinate or a place name".into(),
            ));
        }
        let found = self
            .geocoder
            .geocode(query)
            .await
            .map_err(PlannerError::Geocode)?;
        found
            .ok_or_else(|| PlannerError::LocationNotFound(query.to_string()))
            .and_then(validate_coordinate)
    }

    async fn route_between(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<RouteGeometry, PlannerError> {
        let provided = self
            .directions
            .get_route(start, end)
            .await
            .map_err(PlannerError::Directions)?;
        Ok(route_geometry(
            provided.coordinates,
            provided.distance_meters,
            provided.duration_seconds,
        ))
    }
}
