use crate::models::{Coordinate, RouteGeometry};

/// Fraction of the stated fuel range used before planning the next fill-up.
pub const FUEL_SAFETY_FACTOR: f64 = 0.8;
pub const RESTAURANT_INTERVAL_MILES: f64 = 150.0;
pub const ATTRACTION_INTERVAL_MILES: f64 = 100.0;
/// Upper bound on stops per category for a single route.
pub const MAX_STOPS_PER_CATEGORY: usize = 1_000;

/// How often a category wants a stop along the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// One stop every N miles.
    FixedInterval(f64),
    /// Stops spaced by the safe share of the fuel range; the rider leaves
    /// with a full tank, so the first safe range needs no stop.
    FuelRange(f64),
    /// One stop at the end of each riding day.
    DailyBudget(f64),
}

impl Cadence {
    /// Miles between consecutive stops.
    pub fn interval_miles(&self) -> f64 {
        match *self {
            Cadence::FixedInterval(miles) => miles,
            Cadence::FuelRange(range) => range * FUEL_SAFETY_FACTOR,
            Cadence::DailyBudget(miles) => miles,
        }
    }

    pub fn number_of_stops(&self, total_distance_miles: f64) -> usize {
        let interval = self.interval_miles();
        if !is_usable(total_distance_miles) || !is_usable(interval) {
            return 0;
        }

        let count = match self {
            Cadence::FixedInterval(_) | Cadence::DailyBudget(_) => {
                (total_distance_miles / interval).floor()
            }
            Cadence::FuelRange(_) => (total_distance_miles / interval).ceil() - 1.0,
        };
        count.clamp(0.0, MAX_STOPS_PER_CATEGORY as f64) as usize
    }
}

fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Coordinate at `floor(progress * coordinate_count)`.
///
/// This spaces samples uniformly by vertex index, not by arc length. Provider
/// polylines are dense enough that the two agree closely on open road, but
/// routes that are much denser in towns than on highways bias samples towards
/// the dense sections.
pub fn sample_at(route: &RouteGeometry, progress: f64) -> Option<Coordinate> {
    let count = route.coordinates.len();
    if count == 0 || !progress.is_finite() || !(0.0..1.0).contains(&progress) {
        return None;
    }
    let idx = ((progress * count as f64).floor() as usize).min(count - 1);
    Some(route.coordinates[idx])
}

/// One place along the route where a category wants a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// 1-based stop ordinal.
    pub ordinal: usize,
    pub progress: f64,
    pub coordinate: Coordinate,
    pub distance_from_start_miles: f64,
}

/// Evenly spaced sample points for `cadence`; empty for a degenerate route.
pub fn sample_points(route: &RouteGeometry, cadence: Cadence) -> Vec<SamplePoint> {
    let total = route.total_distance_miles;
    if route.coordinates.is_empty() || !is_usable(total) {
        return Vec::new();
    }

    let interval = cadence.interval_miles();
    let stops = cadence.number_of_stops(total);
    let mut points = Vec::new();

    for ordinal in 1..=stops {
        let progress = (ordinal as f64 * interval) / total;
        if progress >= 1.0 {
            break;
        }
        let Some(coordinate) = sample_at(route, progress) else {
            continue;
        };
        points.push(SamplePoint {
            ordinal,
            progress,
            coordinate,
            // Rounding up near the end must not overshoot the route.
            distance_from_start_miles: (progress * total).round().min(total),
        });
    }

    points
}
