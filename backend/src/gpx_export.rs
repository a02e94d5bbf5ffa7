use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::PlannerError;
use crate::models::{Coordinate, PlaceCategory, RouteGeometry, Stop, StopLists};

const CREATOR: &str = "ride_planner";

/// Encodes the route as a single track and every stop as a waypoint.
pub fn encode_plan_as_gpx(route: &RouteGeometry, stops: &StopLists) -> Result<String, PlannerError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some("Planned ride".into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment
        .points
        .extend(route.coordinates.iter().map(track_point));
    track.segments.push(segment);
    gpx.tracks.push(track);

    gpx.waypoints.extend(stops.iter().map(stop_waypoint));

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn track_point(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lon, coord.lat))
}

fn stop_waypoint(stop: &Stop) -> Waypoint {
    let mut waypoint = Waypoint::new(Point::new(stop.location.lon, stop.location.lat));
    waypoint.name = Some(stop.name.clone());
    waypoint.description = Some(match &stop.address {
        Some(address) => format!("mile {:.0} - {}", stop.distance_from_start_miles, address),
        None => format!("mile {:.0}", stop.distance_from_start_miles),
    });
    waypoint.symbol = Some(symbol(stop.category).to_string());
    waypoint
}

fn symbol(category: PlaceCategory) -> &'static str {
    match category {
        PlaceCategory::GasStation => "Gas Station",
        PlaceCategory::Lodging => "Lodging",
        PlaceCategory::Restaurant => "Restaurant",
        PlaceCategory::Campground => "Campground",
        PlaceCategory::Attraction => "Scenic Area",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(category: PlaceCategory, name: &str, miles: f64) -> Stop {
        Stop {
            category,
            location: Coordinate { lat: 38.6, lon: -109.5 },
            distance_from_start_miles: miles,
            name: name.to_string(),
            address: Some("12 Canyon Rd".into()),
            rating: None,
            website: None,
            phone_number: None,
            sub_type: None,
            detour_miles: None,
            placeholder: false,
        }
    }

    #[test]
    fn gpx_contains_track_and_stop_waypoints() {
        let route = RouteGeometry {
            coordinates: vec![
                Coordinate { lat: 39.7, lon: -105.0 },
                Coordinate { lat: 38.6, lon: -109.5 },
            ],
            total_distance_miles: 350.0,
            total_duration_hours: 5.5,
        };
        let stops = StopLists {
            fuel_stops: vec![stop(PlaceCategory::GasStation, "Green River Fuel", 180.0)],
            hotel_stops: vec![stop(PlaceCategory::Lodging, "Moab Valley Inn", 340.0)],
            ..Default::default()
        };

        let encoded = encode_plan_as_gpx(&route, &stops).unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        let parsed = gpx::read(decoded.as_slice()).unwrap();

        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.tracks[0].segments[0].points.len(), 2);
        assert_eq!(parsed.waypoints.len(), 2);
        assert_eq!(parsed.waypoints[0].name.as_deref(), Some("Green River Fuel"));
        assert_eq!(parsed.waypoints[1].symbol.as_deref(), Some("Lodging"));
    }
}
