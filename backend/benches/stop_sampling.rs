use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ride_planner::geo::path_length_miles;
use ride_planner::models::{Coordinate, RouteGeometry};
use ride_planner::route_index::RouteIndex;
use ride_planner::sampler::{Cadence, sample_points};

fn dense_route(points: usize) -> RouteGeometry {
    let start = Coordinate { lat: 39.7392, lon: -104.9903 };
    let end = Coordinate { lat: 34.0522, lon: -118.2437 };
    let coordinates: Vec<Coordinate> = (0..points)
        .map(|i| start.interpolate(end, i as f64 / (points - 1) as f64))
        .collect();
    let total_distance_miles = path_length_miles(&coordinates);
    RouteGeometry {
        coordinates,
        total_distance_miles,
        total_duration_hours: total_distance_miles / 60.0,
    }
}

fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_points");

    for points in [1_000usize, 10_000, 100_000] {
        let route = dense_route(points);
        group.bench_with_input(BenchmarkId::from_parameter(points), &route, |b, route| {
            b.iter(|| {
                let fuel = sample_points(black_box(route), Cadence::FuelRange(180.0));
                let hotels = sample_points(black_box(route), Cadence::DailyBudget(300.0));
                fuel.len() + hotels.len()
            });
        });
    }

    group.finish();
}

fn benchmark_path_length(c: &mut Criterion) {
    let route = dense_route(100_000);
    c.bench_function("path_length_miles_100k", |b| {
        b.iter(|| path_length_miles(black_box(&route.coordinates)))
    });
}

fn benchmark_route_index(c: &mut Criterion) {
    let route = dense_route(100_000);
    let index = RouteIndex::new(&route);
    let target = Coordinate { lat: 37.1, lon: -111.4 };

    c.bench_function("route_index_build_100k", |b| {
        b.iter(|| RouteIndex::new(black_box(&route)))
    });
    c.bench_function("route_index_detour", |b| {
        b.iter(|| index.detour_miles(black_box(target)))
    });
}

criterion_group!(
    benches,
    benchmark_sampling,
    benchmark_path_length,
    benchmark_route_index
);
criterion_main!(benches);
