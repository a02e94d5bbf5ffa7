use kdtree::KdTree;
use kdtree::distance::squared_euclidean;

use crate::geo::nearest_point;
use crate::models::{Coordinate, RouteGeometry};

/// Number of planar neighbours re-ranked by great-circle distance.
const CANDIDATES: usize = 8;

/// Spatial index over the vertices of a route.
///
/// Vertices are stored as `[lon * cos(lat0), lat]` so that squared euclidean
/// distance in the tree roughly follows ground distance around the route's
/// mean latitude. The closest few are then re-ranked with Haversine.
pub struct RouteIndex {
    tree: KdTree<f64, usize, [f64; 2]>,
    vertices: Vec<Coordinate>,
    lon_scale: f64,
}

impl RouteIndex {
    pub fn new(route: &RouteGeometry) -> Self {
        let vertices: Vec<Coordinate> = route
            .coordinates
            .iter()
            .copied()
            .filter(Coordinate::is_valid)
            .collect();

        let mean_lat = if vertices.is_empty() {
            0.0
        } else {
            vertices.iter().map(|c| c.lat).sum::<f64>() / vertices.len() as f64
        };
        let lon_scale = mean_lat.to_radians().cos().abs().max(0.1);

        let mut tree = KdTree::new(2);
        for (idx, coord) in vertices.iter().enumerate() {
            let _ = tree.add([coord.lon * lon_scale, coord.lat], idx);
        }

        Self {
            tree,
            vertices,
            lon_scale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Closest route vertex to `target` and its distance in miles.
    pub fn nearest_vertex(&self, target: Coordinate) -> Option<(Coordinate, f64)> {
        if self.vertices.is_empty() || !target.is_valid() {
            return None;
        }

        let neighbours = self
            .tree
            .nearest(
                &[target.lon * self.lon_scale, target.lat],
                CANDIDATES,
                &squared_euclidean,
            )
            .ok()?;

        let candidates: Vec<Coordinate> = neighbours
            .into_iter()
            .map(|(_, &idx)| self.vertices[idx])
            .collect();
        nearest_point(target, &candidates).map(|(idx, distance)| (candidates[idx], distance))
    }

    /// How far `place` lies off the route, in miles.
    pub fn detour_miles(&self, place: Coordinate) -> Option<f64> {
        self.nearest_vertex(place).map(|(_, distance)| distance)
    }
}
