// src/math/algorithms/clipping.rs

//! # Polygon Clipping Module
//!
//! Sutherland-Hodgman clipping of a subject polygon against a convex clip
//! polygon or a single half-plane. The subject may be concave; the clipper
//! must be convex. Both inputs are brought to counter-clockwise winding
//! before clipping, so callers may pass either orientation.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
    utils::{constants, simple_geometry, winding},
};
use tracing::trace;

/// Performs polygon clipping operations.
#[derive(Debug, Clone, Copy)]
pub struct PolygonClipper {
    tolerance: f64, // Tolerance for floating-point comparisons
}

impl Default for PolygonClipper {
    /// Creates a default `PolygonClipper` instance.
    ///
    /// Default values:
    /// - `tolerance`: `constants::EPSILON`
    fn default() -> Self {
        Self {
            tolerance: constants::EPSILON,
        }
    }
}

impl PolygonClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance for floating-point comparisons used in the clipping process.
    ///
    /// # Arguments
    /// * `tolerance` - The desired tolerance value. Must be non-negative.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Intersects `subject` with the convex polygon `clip`.
    ///
    /// # Returns
    /// `Ok(Some(points))` with a counter-clockwise loop of at least three
    /// points, or `Ok(None)` if the polygons are disjoint or only touch.
    /// Returns an error if either input has fewer than 3 points.
    pub fn intersect(&self, subject: &[Point2D], clip: &[Point2D]) -> MathResult<Option<Vec<Point2D>>> {
        if subject.len() < 3 || clip.len() < 3 {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: subject.len().min(clip.len()),
            });
        }

        let mut subject = subject.to_vec();
        let mut clip = clip.to_vec();
        winding::ensure_ccw(&mut subject);
        winding::ensure_ccw(&mut clip);

        let mut current = subject;
        for i in 0..clip.len() {
            if current.is_empty() {
                break;
            }
            let a = clip[i];
            let b = clip[(i + 1) % clip.len()];
            current = self.clip_against_edge(&current, a, b);
        }

        let result = self.cleanup(current);
        trace!(vertices = result.as_ref().map_or(0, Vec::len), "sutherland-hodgman done");
        Ok(result)
    }

    /// Keeps the part of `polygon` on the left of the directed line `a -> b`
    /// (points on the line count as inside).
    ///
    /// Returns an empty list when nothing with positive area remains.
    pub fn clip_half_plane(&self, polygon: &[Point2D], a: Point2D, b: Point2D) -> Vec<Point2D> {
        if polygon.len() < 3 {
            return Vec::new();
        }
        let mut subject = polygon.to_vec();
        winding::ensure_ccw(&mut subject);
        let clipped = self.clip_against_edge(&subject, a, b);
        self.cleanup(clipped).unwrap_or_default()
    }

    /// One Sutherland-Hodgman pass against the directed clip edge `a -> b`.
    fn clip_against_edge(&self, input: &[Point2D], a: Point2D, b: Point2D) -> Vec<Point2D> {
        let Some(&last) = input.last() else {
            return Vec::new();
        };
        let mut output = Vec::with_capacity(input.len() + 2);
        let mut s = last;
        for &e in input {
            let s_inside = self.is_inside(s, a, b);
            let e_inside = self.is_inside(e, a, b);
            if e_inside {
                if !s_inside {
                    // edge enters the clip region
                    if let Some(hit) = simple_geometry::line_intersection(s, e, a, b) {
                        output.push(hit);
                    }
                }
                output.push(e);
            } else if s_inside {
                if let Some(hit) = simple_geometry::line_intersection(s, e, a, b) {
                    output.push(hit);
                }
            }
            s = e;
        }
        output
    }

    /// `p` is inside when it lies left of `a -> b` or within `tolerance` of the line.
    #[inline]
    fn is_inside(&self, p: Point2D, a: Point2D, b: Point2D) -> bool {
        let edge = b - a;
        edge.cross(p - a) >= -self.tolerance * edge.length()
    }

    /// Drops consecutive duplicates; `None` for fewer than three points or no area.
    fn cleanup(&self, points: Vec<Point2D>) -> Option<Vec<Point2D>> {
        let mut result: Vec<Point2D> = Vec::with_capacity(points.len());
        for p in points {
            if result.last().is_none_or(|q| !q.nearly_equals(p, self.tolerance)) {
                result.push(p);
            }
        }
        while result.len() > 1
            && result[0].nearly_equals(result[result.len() - 1], self.tolerance)
        {
            result.pop();
        }
        if result.len() < 3 || simple_geometry::polygon_area(&result) <= self.tolerance * self.tolerance {
            return None;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::points_from_tuples;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2D> {
        points_from_tuples(&[
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ])
    }

    #[test]
    fn identical_squares_return_the_square() {
        let sq = square(0.0, 0.0, 4.0);
        let result = PolygonClipper::new().intersect(&sq, &sq).unwrap().unwrap();
        assert_eq!(result, sq);
    }

    #[test]
    fn overlapping_squares() {
        let a = square(0.0, 0.0, 4.0);
        let b = square(2.0, 2.0, 4.0);
        let result = PolygonClipper::new().intersect(&a, &b).unwrap().unwrap();
        assert_eq!(result.len(), 4);
        assert_relative_eq!(simple_geometry::polygon_area(&result), 4.0);
        for corner in square(2.0, 2.0, 2.0) {
            assert!(result.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn clockwise_inputs_are_normalized() {
        let mut a = square(0.0, 0.0, 4.0);
        let mut b = square(2.0, 2.0, 4.0);
        a.reverse();
        b.reverse();
        let result = PolygonClipper::new().intersect(&a, &b).unwrap().unwrap();
        assert_relative_eq!(simple_geometry::signed_area(&result), 4.0);
    }

    #[test]
    fn touching_or_disjoint_squares_do_not_intersect() {
        let clipper = PolygonClipper::new();
        let a = square(0.0, 0.0, 2.0);
        assert_eq!(clipper.intersect(&a, &square(2.0, 0.0, 2.0)).unwrap(), None);
        assert_eq!(clipper.intersect(&a, &square(5.0, 5.0, 1.0)).unwrap(), None);
    }

    #[test]
    fn concave_subject_against_convex_clip() {
        // L-shape clipped by a square covering its corner region.
        let l_shape = points_from_tuples(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ]);
        let clip = square(0.0, 0.0, 2.0);
        let result = PolygonClipper::new().intersect(&l_shape, &clip).unwrap().unwrap();
        assert_relative_eq!(simple_geometry::polygon_area(&result), 3.0);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let a = points_from_tuples(&[(0.0, 0.0), (1.0, 0.0)]);
        let err = PolygonClipper::new().intersect(&a, &square(0.0, 0.0, 1.0));
        assert!(matches!(err, Err(MathError::InsufficientPoints { .. })));
    }

    #[test]
    fn half_plane_clip() {
        let sq = square(0.0, 0.0, 4.0);
        // Keep x <= 1 (left of the upward line at x = 1).
        let kept = PolygonClipper::new().clip_half_plane(&sq, Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0));
        assert_relative_eq!(simple_geometry::polygon_area(&kept), 4.0);
        let none = PolygonClipper::new().clip_half_plane(&sq, Point2D::new(-1.0, 1.0), Point2D::new(-1.0, 0.0));
        assert_eq!(none.len(), 4);
        let gone = PolygonClipper::new().clip_half_plane(&sq, Point2D::new(-1.0, 0.0), Point2D::new(-1.0, 1.0));
        assert!(gone.is_empty());
    }
}
