// src/math/geometry/polygon.rs

use crate::math::{
    types::{Bounds2D, Point2D},
    utils::{simple_geometry, winding},
};
use serde::{Deserialize, Serialize};

/// A simple polygon with zero or more holes.
///
/// `outer` winds counter-clockwise, every hole clockwise. Rings are stored
/// open: the first point is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonWithHoles {
    pub outer: Vec<Point2D>,
    pub holes: Vec<Vec<Point2D>>,
}

impl PolygonWithHoles {
    /// Builds the polygon and normalizes ring windings.
    pub fn new(mut outer: Vec<Point2D>, mut holes: Vec<Vec<Point2D>>) -> Self {
        winding::ensure_ccw(&mut outer);
        for hole in &mut holes {
            winding::ensure_cw(hole);
        }
        Self { outer, holes }
    }

    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Outer area minus the area of all holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| simple_geometry::polygon_area(h))
            .sum();
        simple_geometry::polygon_area(&self.outer) - holes
    }

    /// Inside the outer ring and outside every hole (even-odd).
    pub fn contains_point(&self, point: Point2D) -> bool {
        simple_geometry::point_in_polygon(point, &self.outer)
            && !self
                .holes
                .iter()
                .any(|h| simple_geometry::point_in_polygon(point, h))
    }

    pub fn bounds(&self) -> Option<Bounds2D> {
        Bounds2D::from_points_iter(self.outer.iter().copied())
    }
}

impl From<&PolygonWithHoles> for geo::Polygon<f64> {
    fn from(polygon: &PolygonWithHoles) -> Self {
        let ring = |points: &[Point2D]| -> geo::LineString<f64> {
            points.iter().map(|p| geo::Coord::from(*p)).collect()
        };
        geo::Polygon::new(
            ring(&polygon.outer),
            polygon.holes.iter().map(|h| ring(h)).collect(),
        )
    }
}

impl From<&geo::Polygon<f64>> for PolygonWithHoles {
    fn from(polygon: &geo::Polygon<f64>) -> Self {
        PolygonWithHoles::new(
            open_ring(polygon.exterior()),
            polygon.interiors().iter().map(open_ring).collect(),
        )
    }
}

/// Ring coordinates without the repeated closing point.
fn open_ring(ring: &geo::LineString<f64>) -> Vec<Point2D> {
    let mut points: Vec<Point2D> = ring.coords().map(|c| Point2D::from(*c)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::points_from_tuples;
    use approx::assert_relative_eq;

    fn framed_square() -> PolygonWithHoles {
        PolygonWithHoles::new(
            points_from_tuples(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]),
            vec![points_from_tuples(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)])],
        )
    }

    #[test]
    fn windings_are_normalized() {
        let p = framed_square();
        assert!(simple_geometry::signed_area(&p.outer) > 0.0);
        assert!(simple_geometry::signed_area(&p.holes[0]) < 0.0);
        assert_relative_eq!(p.area(), 12.0);
    }

    #[test]
    fn holes_are_not_inside() {
        let p = framed_square();
        assert!(p.contains_point(Point2D::new(0.5, 0.5)));
        assert!(!p.contains_point(Point2D::new(2.0, 2.0)));
        assert!(!p.contains_point(Point2D::new(5.0, 2.0)));
    }

    #[test]
    fn geo_conversion_keeps_rings_open() {
        let p = framed_square();
        let geo_poly = geo::Polygon::from(&p);
        assert_eq!(geo_poly.exterior().0.len(), 5);
        let back = PolygonWithHoles::from(&geo_poly);
        assert_eq!(back.outer.len(), 4);
        assert_eq!(back.holes[0].len(), 4);
        assert_relative_eq!(back.area(), 12.0);
    }
}
