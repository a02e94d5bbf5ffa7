use crate::models::{Coordinate, NearbyPlace, PlaceMatch, RouteGeometry};

pub const EARTH_RADIUS_MILES: f64 = 3_958.8;
pub const METERS_PER_MILE: f64 = 1_609.34;
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Great-circle distance in miles between two lat/lon points.
///
/// NaN inputs propagate to the result; callers must guard.
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + phi1.cos() * phi2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_MILES * h.min(1.0).sqrt().asin()
}

pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    distance_miles(a.lat, a.lon, b.lat, b.lon)
}

pub fn path_length_miles(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_miles(w[0], w[1])).sum()
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

/// Converts a provider route (meters, seconds) into a `RouteGeometry`.
pub fn route_geometry(
    coordinates: Vec<Coordinate>,
    distance_meters: f64,
    duration_seconds: f64,
) -> RouteGeometry {
    RouteGeometry {
        coordinates,
        total_distance_miles: meters_to_miles(distance_meters),
        total_duration_hours: seconds_to_hours(duration_seconds),
    }
}

/// Index and distance of the candidate closest to `target`.
pub fn nearest_point(target: Coordinate, candidates: &[Coordinate]) -> Option<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, haversine_miles(target, *c)))
        .filter(|(_, d)| !d.is_nan())
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Keeps places within `radius_miles` of `center`, closest first.
pub fn sort_by_distance(
    center: Coordinate,
    places: Vec<PlaceMatch>,
    radius_miles: f64,
) -> Vec<NearbyPlace> {
    let mut nearby: Vec<NearbyPlace> = places
        .into_iter()
        .map(|place| NearbyPlace {
            distance_miles: haversine_miles(center, place.location),
            place,
        })
        .filter(|p| p.distance_miles <= radius_miles)
        .collect();
    nearby.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lat: f64, lon: f64) -> PlaceMatch {
        PlaceMatch {
            name: name.to_string(),
            address: String::new(),
            location: Coordinate { lat, lon },
            rating: None,
            website: None,
            phone_number: None,
            category_tags: Vec::new(),
        }
    }

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate { lat: 39.74, lon: -104.99 };
        assert_eq!(haversine_miles(point, point), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let d = distance_miles(0.0, 0.0, 0.0, 1.0);
        assert!((d - 69.17).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_known_distance_denver_to_moab() {
        // Denver (39.7392, -104.9903) to Moab (38.5733, -109.5498), ~258 mi
        let d = distance_miles(39.7392, -104.9903, 38.5733, -109.5498);
        assert!((d - 258.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_miles(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_path_length_empty_and_single() {
        assert_eq!(path_length_miles(&[]), 0.0);
        assert_eq!(path_length_miles(&[Coordinate { lat: 1.0, lon: 1.0 }]), 0.0);
    }

    #[test]
    fn test_route_geometry_converts_units() {
        let route = route_geometry(Vec::new(), 160_934.0, 7_200.0);
        assert!((route.total_distance_miles - 100.0).abs() < 1e-9);
        assert_eq!(route.total_duration_hours, 2.0);
    }

    #[test]
    fn test_nearest_point() {
        let candidates = [
            Coordinate { lat: 0.0, lon: 0.0 },
            Coordinate { lat: 0.0, lon: 2.0 },
            Coordinate { lat: 0.0, lon: 1.0 },
        ];
        let (idx, d) = nearest_point(Coordinate { lat: 0.0, lon: 1.1 }, &candidates).unwrap();
        assert_eq!(idx, 2);
        assert!(d < 7.0);
        assert!(nearest_point(Coordinate { lat: 0.0, lon: 0.0 }, &[]).is_none());
    }

    #[test]
    fn test_sort_by_distance_filters_and_orders() {
        let center = Coordinate { lat: 0.0, lon: 0.0 };
        let places = vec![
            place("far", 0.0, 0.5),
            place("near", 0.0, 0.1),
            place("out", 0.0, 3.0),
        ];
        let sorted = sort_by_distance(center, places, 50.0);
        let names: Vec<_> = sorted.iter().map(|p| p.place.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_distance_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(haversine_miles(a, b) >= 0.0);
            }

            #[test]
            fn prop_distance_symmetric(a in valid_coord(), b in valid_coord()) {
                let ab = haversine_miles(a, b);
                let ba = haversine_miles(b, a);
                prop_assert!((ab - ba).abs() < 1e-9);
            }

            #[test]
            fn prop_distance_identity_is_zero(coord in valid_coord()) {
                prop_assert_eq!(haversine_miles(coord, coord), 0.0);
            }

            #[test]
            fn prop_distance_bounded_by_half_circumference(a in valid_coord(), b in valid_coord()) {
                let max = std::f64::consts::PI * EARTH_RADIUS_MILES;
                prop_assert!(haversine_miles(a, b) <= max + 0.1);
            }
        }
    }
}
