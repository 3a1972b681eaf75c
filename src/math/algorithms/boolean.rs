// src/math/algorithms/boolean.rs

//! Multi-polygon union and containment ("island") detection.
//!
//! The union delegates to `geo::BooleanOps`. Input coordinates are snapped
//! to an integer grid of `precision` first so nearly coincident edges from
//! clipping or capping become exactly coincident, and scaled back afterwards.

use crate::math::{
    error::{MathError, MathResult},
    geometry::PolygonWithHoles,
    types::Point2D,
    utils::{simple_geometry, union_find::DisjointSet},
};
use geo::{BooleanOps, Coord, LineString, MapCoords, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings of the polygon union.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnionConfig {
    /// Grid size used to snap coordinates before the union.
    pub precision: f64,
}

impl Default for UnionConfig {
    fn default() -> Self {
        Self { precision: 1e-6 }
    }
}

impl UnionConfig {
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if !(self.precision.is_finite() && self.precision > 0.0) {
            return Err(MathError::InvalidConfiguration {
                message: format!("Union precision must be positive, got {}", self.precision),
            });
        }
        Ok(())
    }
}

/// Boolean operations on sets of polygons given as point lists.
#[derive(Debug, Clone, Default)]
pub struct PolygonBooleanOps {
    config: UnionConfig,
}

impl PolygonBooleanOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: UnionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &UnionConfig {
        &self.config
    }

    /// Union of all `polygons`, flattened into outer boundaries with holes.
    ///
    /// Every input must have at least 3 points. Outer rings of the result
    /// wind counter-clockwise, holes clockwise.
    pub fn union(&self, polygons: &[Vec<Point2D>]) -> MathResult<Vec<PolygonWithHoles>> {
        self.config.validate()?;
        if let Some(bad) = polygons.iter().find(|p| p.len() < 3) {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: bad.len(),
            });
        }

        let precision = self.config.precision;
        let merged = polygons
            .iter()
            .map(|points| MultiPolygon::new(vec![self.snap(points)]))
            .fold(MultiPolygon::new(Vec::new()), |acc, next| acc.union(&next));

        let result: Vec<PolygonWithHoles> = merged
            .iter()
            .map(|poly| {
                let restored = poly.map_coords(|c| Coord {
                    x: c.x * precision,
                    y: c.y * precision,
                });
                PolygonWithHoles::from(&restored)
            })
            .filter(|poly| poly.outer.len() >= 3)
            .collect();

        debug!(
            input = polygons.len(),
            output = result.len(),
            holes = result.iter().map(|p| p.holes.len()).sum::<usize>(),
            "polygon union"
        );
        Ok(result)
    }

    /// Polygon in integer grid coordinates.
    fn snap(&self, points: &[Point2D]) -> Polygon<f64> {
        let precision = self.config.precision;
        let ring: LineString<f64> = points
            .iter()
            .map(|p| Coord {
                x: (p.x / precision).round(),
                y: (p.y / precision).round(),
            })
            .collect();
        Polygon::new(ring, Vec::new())
    }
}

/// Groups mutually non-intersecting polygons into islands.
///
/// A polygon is contained in another when its first vertex lies inside it
/// (even-odd test). Containment is merged transitively, so holes of holes
/// end up attached to the outermost container. Returns `(root, holes)`
/// pairs sorted by root index, with hole indices sorted as well. Polygons
/// that neither contain nor are contained form islands without holes.
pub fn find_polygon_islands(polygons: &[Vec<Point2D>]) -> Vec<(usize, Vec<usize>)> {
    let n = polygons.len();
    let mut sets = DisjointSet::new(n);
    let mut contained = vec![false; n];

    for (i, inner) in polygons.iter().enumerate() {
        let Some(&sample) = inner.first() else {
            continue;
        };
        for (j, outer) in polygons.iter().enumerate() {
            if i != j && simple_geometry::point_in_polygon(sample, outer) {
                contained[i] = true;
                sets.union(i, j);
            }
        }
    }

    let mut islands: Vec<(usize, Vec<usize>)> = (0..n)
        .filter(|&i| !contained[i])
        .map(|root| (root, Vec::new()))
        .collect();
    let root_of_set: std::collections::HashMap<usize, usize> = islands
        .iter()
        .enumerate()
        .map(|(slot, (root, _))| (sets.find(*root), slot))
        .collect();

    for i in (0..n).filter(|&i| contained[i]) {
        if let Some(&slot) = root_of_set.get(&sets.find(i)) {
            islands[slot].1.push(i);
        }
    }

    debug!(polygons = n, islands = islands.len(), "island detection");
    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::points_from_tuples;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2D> {
        points_from_tuples(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    #[test]
    fn overlapping_squares_merge() {
        let result = PolygonBooleanOps::new()
            .union(&[rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)])
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].has_holes());
        assert_relative_eq!(result[0].area(), 7.0, epsilon = 1e-6);
        assert!(simple_geometry::signed_area(&result[0].outer) > 0.0);
    }

    #[test]
    fn disjoint_squares_stay_separate() {
        let result = PolygonBooleanOps::new()
            .union(&[rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 6.0, 6.0)])
            .unwrap();
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(PolygonWithHoles::area).sum();
        assert_relative_eq!(total, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn frame_produces_a_hole() {
        let frame = [
            rect(0.0, 0.0, 1.0, 4.0),
            rect(3.0, 0.0, 4.0, 4.0),
            rect(0.5, 0.0, 3.5, 1.0),
            rect(0.5, 3.0, 3.5, 4.0),
        ];
        let result = PolygonBooleanOps::new().union(&frame).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert!(simple_geometry::signed_area(&result[0].holes[0]) < 0.0);
        assert_relative_eq!(result[0].area(), 12.0, epsilon = 1e-6);
        assert!(!result[0].contains_point(Point2D::new(2.0, 2.0)));
    }

    #[test]
    fn snapping_closes_hairline_gaps() {
        let result = PolygonBooleanOps::new()
            .union(&[rect(0.0, 0.0, 1.0, 1.0), rect(1.0 + 1e-8, 0.0, 2.0, 1.0)])
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result[0].area(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let ops = PolygonBooleanOps::new();
        let short = points_from_tuples(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!(matches!(
            ops.union(&[short]),
            Err(MathError::InsufficientPoints { actual: 2, .. })
        ));
        let bad = ops.with_config(UnionConfig::default().with_precision(0.0));
        assert!(bad.union(&[rect(0.0, 0.0, 1.0, 1.0)]).is_err());
        assert!(PolygonBooleanOps::new().union(&[]).unwrap().is_empty());
    }

    #[test]
    fn nested_polygons_collapse_to_roots() {
        let polygons = vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(1.0, 1.0, 4.0, 4.0),
            rect(2.0, 2.0, 3.0, 3.0),
            rect(6.0, 6.0, 9.0, 9.0),
            rect(20.0, 20.0, 21.0, 21.0),
        ];
        let islands = find_polygon_islands(&polygons);
        assert_eq!(islands, vec![(0, vec![1, 2, 3]), (4, vec![])]);
    }
}
