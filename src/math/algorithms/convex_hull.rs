// src/math/algorithms/convex_hull.rs

//! # Convex Hull (QuickHull)
//!
//! Recursive divide-and-conquer hull extraction. The hull is reported as
//! indices into the caller's point array, ordered counter-clockwise and
//! starting at the point of minimal X.
//!
//! The side test is a signed cross product with a strict `> 0`: collinear
//! points count as "not right" and fall into the opposite partition. This
//! decides which collinear or duplicate points can still be promoted onto the
//! hull boundary; it never lets a point end up strictly outside the hull.

use crate::math::{
    error::{MathError, MathResult},
    types::{Point2D, Point3D, from_plane, to_plane},
    utils::{constants, simple_geometry},
};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hull perimeter of a point set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvexHull {
    /// Hull points in perimeter order.
    pub points: Vec<Point2D>,
    /// Indices of `points` in the input array.
    pub indices: Vec<usize>,
}

impl ConvexHull {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn area(&self) -> f64 {
        simple_geometry::polygon_area(&self.points)
    }
}

/// How the plane of a 3D point set is determined before projecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaneFit {
    /// Average of fan normals around the centroid; tolerant of noise.
    #[default]
    Average,
    /// Plane through the first non-degenerate triple; every other point must
    /// lie on it within tolerance.
    Strict,
}

/// A hull computed in the plane of a coplanar 3D point set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedHull {
    /// Hull in rotated plane coordinates; indices refer to the 3D input.
    pub hull: ConvexHull,
    /// Rotation taking input points into the XY-aligned plane.
    pub rotation: Rotation3<f64>,
    /// Z of the rotated plane.
    pub plane_offset: f64,
}

impl ProjectedHull {
    /// Maps a plane point back into the original 3D frame.
    pub fn lift(&self, p: Point2D) -> Point3D {
        self.rotation.inverse() * from_plane(p, self.plane_offset)
    }
}

/// Computes convex hulls with QuickHull.
#[derive(Debug, Clone, Copy)]
pub struct ConvexHullComputer {
    /// Tolerance for the coplanarity check of 3D inputs.
    tolerance: f64,
    plane_fit: PlaneFit,
}

impl Default for ConvexHullComputer {
    /// Default values:
    /// - `tolerance`: `constants::EPSILON * 10.0`
    /// - `plane_fit`: `PlaneFit::Average`
    fn default() -> Self {
        Self {
            tolerance: constants::EPSILON * 10.0,
            plane_fit: PlaneFit::default(),
        }
    }
}

impl ConvexHullComputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    pub fn with_plane_fit(mut self, plane_fit: PlaneFit) -> Self {
        self.plane_fit = plane_fit;
        self
    }

    /// Hull of a 2D point set.
    ///
    /// Fewer than three points are returned verbatim as the "hull".
    pub fn compute(&self, input_points: &[Point2D]) -> ConvexHull {
        let n = input_points.len();
        if n < 3 {
            return ConvexHull {
                points: input_points.to_vec(),
                indices: (0..n).collect(),
            };
        }

        // Baseline between the extreme X points (ties broken by Y).
        let mut min_idx = 0;
        let mut max_idx = 0;
        for (i, p) in input_points.iter().enumerate() {
            let lo = input_points[min_idx];
            let hi = input_points[max_idx];
            if p.x < lo.x || (p.x == lo.x && p.y < lo.y) {
                min_idx = i;
            }
            if p.x > hi.x || (p.x == hi.x && p.y >= hi.y) {
                max_idx = i;
            }
        }
        if min_idx == max_idx {
            // all points coincide
            max_idx = if min_idx == 0 { 1 } else { 0 };
        }

        let a = input_points[min_idx];
        let b = input_points[max_idx];
        let (right, left): (Vec<usize>, Vec<usize>) = (0..n)
            .filter(|&i| i != min_idx && i != max_idx)
            .partition(|&i| Self::is_right(a, b, input_points[i]));

        let mut indices = Vec::with_capacity(n);
        indices.push(min_idx);
        Self::find_hull(input_points, min_idx, max_idx, &right, &mut indices);
        indices.push(max_idx);
        Self::find_hull(input_points, max_idx, min_idx, &left, &mut indices);

        debug!(input = n, hull = indices.len(), "quickhull finished");
        ConvexHull {
            points: indices.iter().map(|&i| input_points[i]).collect(),
            indices,
        }
    }

    /// Signed side value of `p` against the directed line `a -> b`;
    /// positive means right (clockwise) of the line.
    #[inline]
    fn side(a: Point2D, b: Point2D, p: Point2D) -> f64 {
        (p - a).cross(b - a)
    }

    #[inline]
    fn is_right(a: Point2D, b: Point2D, p: Point2D) -> bool {
        Self::side(a, b, p) > 0.0
    }

    /// Appends the hull points strictly between `p` and `q` (walking the
    /// right side of `p -> q`) to `out`.
    fn find_hull(points: &[Point2D], p: usize, q: usize, candidates: &[usize], out: &mut Vec<usize>) {
        let Some(&first) = candidates.first() else {
            return;
        };
        let (pp, pq) = (points[p], points[q]);

        let mut farthest = first;
        let mut best = Self::side(pp, pq, points[first]);
        for &c in &candidates[1..] {
            let d = Self::side(pp, pq, points[c]);
            if d > best {
                best = d;
                farthest = c;
            }
        }
        let pc = points[farthest];

        let before: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| i != farthest && Self::is_right(pp, pc, points[i]))
            .collect();
        let after: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| i != farthest && Self::is_right(pc, pq, points[i]))
            .collect();

        Self::find_hull(points, p, farthest, &before, out);
        out.push(farthest);
        Self::find_hull(points, farthest, q, &after, out);
    }

    /// Hull of a coplanar 3D point set. The points are rotated into an
    /// XY-aligned plane first; the rotation is returned so callers can map
    /// results back with [`ProjectedHull::lift`].
    pub fn compute_3d_planar(&self, points: &[Point3D]) -> MathResult<ProjectedHull> {
        let rotation = if points.len() < 3 {
            Rotation3::identity()
        } else {
            let normal = match self.plane_fit {
                PlaneFit::Average => self.average_normal(points)?,
                PlaneFit::Strict => self.strict_normal(points)?,
            };
            Rotation3::rotation_between(&normal, &Vector3::z()).unwrap_or_else(|| {
                // Normal zeigt genau entgegen +Z
                Rotation3::from_axis_angle(&Vector3::x_axis(), constants::PI)
            })
        };

        let rotated: Vec<Point3D> = points.iter().map(|p| rotation * p).collect();
        let plane_offset = if rotated.is_empty() {
            0.0
        } else {
            rotated.iter().map(|p| p.z).sum::<f64>() / rotated.len() as f64
        };
        let planar: Vec<Point2D> = rotated.iter().map(to_plane).collect();

        Ok(ProjectedHull {
            hull: self.compute(&planar),
            rotation,
            plane_offset,
        })
    }

    fn centroid(points: &[Point3D]) -> Point3D {
        points.iter().sum::<Point3D>() / points.len() as f64
    }

    fn plane_tolerance(&self, points: &[Point3D], centroid: &Point3D) -> f64 {
        let extent = points
            .iter()
            .map(|p| (p - centroid).norm())
            .fold(0.0_f64, f64::max);
        self.tolerance * extent.max(1.0)
    }

    fn average_normal(&self, points: &[Point3D]) -> MathResult<Vector3<f64>> {
        let c = Self::centroid(points);
        let tol = self.plane_tolerance(points, &c);
        let mut reference: Option<Vector3<f64>> = None;
        let mut sum = Vector3::zeros();
        for i in 0..points.len() {
            let a = points[i] - c;
            let b = points[(i + 1) % points.len()] - c;
            let n = a.cross(&b);
            if n.norm() <= tol * tol {
                continue;
            }
            let reference = *reference.get_or_insert(n);
            sum += if n.dot(&reference) < 0.0 { -n } else { n };
        }
        sum.try_normalize(constants::EPSILON_SQUARED)
            .ok_or_else(|| MathError::GeometricFailure {
                operation: "cannot fit a plane through collinear 3D points".to_string(),
            })
    }

    fn strict_normal(&self, points: &[Point3D]) -> MathResult<Vector3<f64>> {
        let c = Self::centroid(points);
        let tol = self.plane_tolerance(points, &c);
        let origin = points[0];
        let normal = points
            .iter()
            .map(|p| p - origin)
            .find(|u| u.norm() > tol)
            .and_then(|u| {
                points
                    .iter()
                    .map(|p| u.cross(&(p - origin)))
                    .find(|n| n.norm() > tol * u.norm())
            })
            .and_then(|n| n.try_normalize(constants::EPSILON_SQUARED))
            .ok_or_else(|| MathError::GeometricFailure {
                operation: "cannot fit a plane through collinear 3D points".to_string(),
            })?;

        let deviation = points
            .iter()
            .map(|p| normal.dot(&(p - origin)).abs())
            .fold(0.0_f64, f64::max);
        if deviation > tol {
            return Err(MathError::NotCoplanar {
                deviation,
                tolerance: tol,
            });
        }
        Ok(normal)
    }
}
