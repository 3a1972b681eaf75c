// src/math/utils.rs

/// Numeric constants.
pub mod constants {
    /// Default tolerance for coordinate comparisons.
    pub const EPSILON: f64 = 1e-6;
    pub const EPSILON_SQUARED: f64 = EPSILON * EPSILON;
    pub const TAU: f64 = std::f64::consts::TAU;
    pub const PI: f64 = std::f64::consts::PI;
}

/// Float comparisons with tolerance.
pub mod comparison {
    use super::constants::EPSILON;

    /// `a` and `b` differ by at most `EPSILON`.
    #[inline]
    pub fn nearly_equal(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPSILON
    }

    /// `a` and `b` differ by at most `epsilon`.
    #[inline]
    pub fn nearly_equal_eps(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() <= epsilon
    }

    /// `a` is within `EPSILON` of zero.
    #[inline]
    pub fn nearly_zero(a: f64) -> bool {
        a.abs() <= EPSILON
    }
}

/// Small geometric helpers on plain points and point loops.
pub mod simple_geometry {
    use super::constants;
    use crate::math::types::{Point2D, Point3D};

    /// Orientation of the triple `(a, b, c)`: positive for a counter-clockwise
    /// turn, negative for clockwise, zero when collinear.
    #[inline]
    pub fn orient(a: Point2D, b: Point2D, c: Point2D) -> f64 {
        (b - a).cross(c - a)
    }

    /// Intersection of the infinite lines `p1-p2` and `p3-p4`.
    ///
    /// Returns `None` when the lines are (near) parallel; the threshold is
    /// relative to the lengths of both direction vectors.
    pub fn line_intersection(p1: Point2D, p2: Point2D, p3: Point2D, p4: Point2D) -> Option<Point2D> {
        let d1 = p2 - p1;
        let d2 = p4 - p3;
        let denominator = d1.cross(d2);
        let scale = d1.length() * d2.length();
        if denominator.abs() <= constants::EPSILON_SQUARED * scale.max(1.0) {
            return None;
        }
        let t = (p3 - p1).cross(d2) / denominator;
        Some(p1 + d1 * t)
    }

    /// Signed shoelace area. Positive for counter-clockwise loops.
    pub fn signed_area(points: &[Point2D]) -> f64 {
        if points.len() < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for i in 0..points.len() {
            let j = (i + 1) % points.len();
            twice_area += points[i].cross(points[j]);
        }
        twice_area * 0.5
    }

    pub fn polygon_area(points: &[Point2D]) -> f64 {
        signed_area(points).abs()
    }

    /// Area weighted centroid; falls back to the vertex average for loops
    /// without area.
    pub fn polygon_centroid(points: &[Point2D]) -> Option<Point2D> {
        if points.is_empty() {
            return None;
        }
        let area = signed_area(points);
        if area.abs() <= constants::EPSILON_SQUARED {
            let sum = points.iter().fold(Point2D::ZERO, |acc, p| acc + *p);
            return Some(sum / points.len() as f64);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..points.len() {
            let p = points[i];
            let q = points[(i + 1) % points.len()];
            let f = p.cross(q);
            cx += (p.x + q.x) * f;
            cy += (p.y + q.y) * f;
        }
        Some(Point2D::new(cx / (6.0 * area), cy / (6.0 * area)))
    }

    /// Even-odd ray casting test. Points exactly on the boundary may fall
    /// either way.
    pub fn point_in_polygon(point: Point2D, polygon: &[Point2D]) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let pi = polygon[i];
            let pj = polygon[j];
            if (pi.y > point.y) != (pj.y > point.y) {
                let x_cross = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// First pair of tolerance-equal points, as `(lower, higher)` index.
    /// `order` must list the point indices sorted ascending by `key`.
    pub fn first_duplicate(
        points: &[Point2D],
        order: &[usize],
        key: impl Fn(Point2D) -> f64,
    ) -> Option<(usize, usize)> {
        for (pos, &i) in order.iter().enumerate() {
            for &j in &order[pos + 1..] {
                if key(points[j]) - key(points[i]) > constants::EPSILON {
                    break;
                }
                if points[i] == points[j] {
                    return Some((i.min(j), i.max(j)));
                }
            }
        }
        None
    }

    /// Newell normal of a closed 3D loop. Its length is twice the loop area.
    pub fn polygon_normal(points: &[Point3D]) -> Point3D {
        let mut normal = Point3D::zeros();
        for i in 0..points.len() {
            let cur = points[i];
            let next = points[(i + 1) % points.len()];
            normal.x += (cur.y - next.y) * (cur.z + next.z);
            normal.y += (cur.z - next.z) * (cur.x + next.x);
            normal.z += (cur.x - next.x) * (cur.y + next.y);
        }
        normal
    }
}

/// Winding helpers on plain point loops.
pub mod winding {
    use super::{comparison, simple_geometry};
    use crate::math::types::Point2D;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PolygonOrientation {
        Clockwise,
        CounterClockwise,
        /// Fewer than three points or no enclosed area.
        Degenerate,
    }

    pub fn orientation(points: &[Point2D]) -> PolygonOrientation {
        let area = simple_geometry::signed_area(points);
        if comparison::nearly_zero(area) {
            PolygonOrientation::Degenerate
        } else if area > 0.0 {
            PolygonOrientation::CounterClockwise
        } else {
            PolygonOrientation::Clockwise
        }
    }

    /// Reverses the loop in place if it winds clockwise.
    pub fn ensure_ccw(points: &mut [Point2D]) {
        if simple_geometry::signed_area(points) < 0.0 {
            points.reverse();
        }
    }

    /// Reverses the loop in place if it winds counter-clockwise.
    pub fn ensure_cw(points: &mut [Point2D]) {
        if simple_geometry::signed_area(points) > 0.0 {
            points.reverse();
        }
    }
}

/// Disjoint-set forest over `0..n` with path halving and union by size.
pub mod union_find {
    #[derive(Debug, Clone)]
    pub struct DisjointSet {
        parent: Vec<usize>,
        size: Vec<usize>,
    }

    impl DisjointSet {
        pub fn new(n: usize) -> Self {
            Self {
                parent: (0..n).collect(),
                size: vec![1; n],
            }
        }

        pub fn find(&mut self, mut x: usize) -> usize {
            while self.parent[x] != x {
                self.parent[x] = self.parent[self.parent[x]];
                x = self.parent[x];
            }
            x
        }

        /// Merges the sets of `a` and `b`. Returns `false` if they were already joined.
        pub fn union(&mut self, a: usize, b: usize) -> bool {
            let (mut ra, mut rb) = (self.find(a), self.find(b));
            if ra == rb {
                return false;
            }
            if self.size[ra] < self.size[rb] {
                std::mem::swap(&mut ra, &mut rb);
            }
            self.parent[rb] = ra;
            self.size[ra] += self.size[rb];
            true
        }

        pub fn len(&self) -> usize {
            self.parent.len()
        }

        pub fn is_empty(&self) -> bool {
            self.parent.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::simple_geometry::*;
    use super::winding::*;
    use crate::math::types::{Point2D, Point3D, points_from_tuples};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unit_square() -> Vec<Point2D> {
        points_from_tuples(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn area_and_winding() {
        let mut square = unit_square();
        assert_relative_eq!(signed_area(&square), 1.0);
        assert_eq!(orientation(&square), PolygonOrientation::CounterClockwise);
        square.reverse();
        assert_relative_eq!(signed_area(&square), -1.0);
        assert_eq!(orientation(&square), PolygonOrientation::Clockwise);
        ensure_ccw(&mut square);
        assert_eq!(orientation(&square), PolygonOrientation::CounterClockwise);
        let line = points_from_tuples(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(orientation(&line), PolygonOrientation::Degenerate);
    }

    #[test]
    fn centroid_and_containment() {
        let square = unit_square();
        assert_eq!(polygon_centroid(&square).unwrap(), Point2D::new(0.5, 0.5));
        assert!(point_in_polygon(Point2D::new(0.25, 0.75), &square));
        assert!(!point_in_polygon(Point2D::new(1.5, 0.5), &square));
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(1.0, 0.0);
        assert!(line_intersection(a, b, Point2D::new(0.0, 1.0), Point2D::new(5.0, 1.0)).is_none());
        let hit = line_intersection(a, b, Point2D::new(0.5, -1.0), Point2D::new(0.5, 1.0)).unwrap();
        assert_eq!(hit, Point2D::new(0.5, 0.0));
    }

    #[test]
    fn disjoint_set_merges_transitively() {
        let mut sets = super::union_find::DisjointSet::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(3, 1));
        assert!(!sets.union(0, 3));
        assert_eq!(sets.find(3), sets.find(0));
        assert_ne!(sets.find(2), sets.find(0));
        assert_eq!(sets.len(), 5);
    }

    #[test]
    fn newell_normal_of_xy_square() {
        let square = [
            Point3D::new(0.0, 0.0, 2.0),
            Point3D::new(1.0, 0.0, 2.0),
            Point3D::new(1.0, 1.0, 2.0),
            Point3D::new(0.0, 1.0, 2.0),
        ];
        let n = polygon_normal(&square);
        assert_abs_diff_eq!(n.x, 0.0);
        assert_abs_diff_eq!(n.y, 0.0);
        assert_relative_eq!(n.z, 2.0);
    }
}
