// src/math/geometry/edge.rs

//! # Edge Model
//!
//! A single representation for directed straight edges that may be bounded
//! (segment), half bounded (ray) or unbounded (line). Edges never own their
//! points: they index into a shared point array, so two edges that reference
//! the same index share that point exactly, without any float comparison.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
    utils::constants,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A directed straight edge over a shared point array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Edge {
    /// Bounded by two points of the pool.
    Segment { p0: usize, p1: usize },
    /// Starts at `p0` and is unbounded towards `direction`.
    Ray { p0: usize, direction: Point2D },
    /// Passes through `p0` and is unbounded along `direction` and its negation.
    Line { p0: usize, direction: Point2D },
}

impl Edge {
    pub fn segment(p0: usize, p1: usize) -> Self {
        Edge::Segment { p0, p1 }
    }

    pub fn ray(p0: usize, direction: Point2D) -> Self {
        Edge::Ray { p0, direction }
    }

    pub fn line(p0: usize, direction: Point2D) -> Self {
        Edge::Line { p0, direction }
    }

    /// Index of the anchor point.
    pub fn start(&self) -> usize {
        match *self {
            Edge::Segment { p0, .. } | Edge::Ray { p0, .. } | Edge::Line { p0, .. } => p0,
        }
    }

    /// Point indices that take part in chain adjacency. A line's anchor is
    /// only a representative point, not an endpoint, so lines report none.
    pub fn point_indices(&self) -> Vec<usize> {
        match *self {
            Edge::Segment { p0, p1 } => vec![p0, p1],
            Edge::Ray { p0, .. } => vec![p0],
            Edge::Line { .. } => Vec::new(),
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, Edge::Segment { .. })
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Edge::Line { .. })
    }

    pub fn is_ray(&self) -> bool {
        matches!(self, Edge::Ray { .. })
    }

    /// Direction vector (not normalized for segments).
    pub fn direction(&self, points: &[Point2D]) -> Point2D {
        match *self {
            Edge::Segment { p0, p1 } => points[p1] - points[p0],
            Edge::Ray { direction, .. } | Edge::Line { direction, .. } => direction,
        }
    }

    /// The point `length` units along the edge from its anchor. Segments
    /// return their end point regardless of `length`.
    pub fn far_point(&self, points: &[Point2D], length: f64) -> Point2D {
        match *self {
            Edge::Segment { p1, .. } => points[p1],
            Edge::Ray { p0, direction } | Edge::Line { p0, direction } => {
                points[p0] + direction.normalize_or_zero() * length
            }
        }
    }

    /// Nearest point on the edge to `query`.
    ///
    /// The projection parameter is clamped to `[0, 1]` for segments, to
    /// `[0, inf)` for rays and left free for lines.
    pub fn closest_point(&self, points: &[Point2D], query: Point2D) -> Point2D {
        let origin = points[self.start()];
        let dir = self.direction(points);
        let len_sq = dir.length_squared();
        if len_sq <= constants::EPSILON_SQUARED {
            return origin;
        }
        let t = (query - origin).dot(dir) / len_sq;
        let t = match self {
            Edge::Segment { .. } => t.clamp(0.0, 1.0),
            Edge::Ray { .. } => t.max(0.0),
            Edge::Line { .. } => t,
        };
        origin + dir * t
    }

    pub fn distance_to(&self, points: &[Point2D], query: Point2D) -> f64 {
        self.closest_point(points, query).distance(query)
    }

    /// Point index shared by both edges, if any.
    pub fn common_point(&self, other: &Edge) -> Option<usize> {
        let theirs = other.point_indices();
        self.point_indices()
            .into_iter()
            .find(|idx| theirs.contains(idx))
    }
}

/// Turns a connected chain of edges into an ordered point loop.
///
/// A closed chain (segments only, each consecutive pair and the last/first
/// pair sharing an endpoint) yields one point per edge. An open chain must
/// start and end with a ray; each ray contributes its far point at
/// `ray_length` from its anchor. Lines cannot be chained.
pub fn polygon_from_edge_chain(
    points: &[Point2D],
    edges: &[Edge],
    ray_length: f64,
) -> MathResult<Vec<Point2D>> {
    let n = edges.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if edges.iter().any(Edge::is_line) {
        return Err(MathError::GeometricFailure {
            operation: "line edges have no endpoints to chain".to_string(),
        });
    }
    if n == 1 {
        return Ok(match edges[0] {
            Edge::Segment { p0, p1 } => vec![points[p0], points[p1]],
            ray => vec![points[ray.start()], ray.far_point(points, ray_length)],
        });
    }

    let shared = |i: usize, j: usize| -> MathResult<usize> {
        edges[i]
            .common_point(&edges[j])
            .ok_or(MathError::BrokenEdgeChain { index: i, next: j })
    };

    let open = edges[0].is_ray();
    if open != edges[n - 1].is_ray() || edges[1..n - 1].iter().any(Edge::is_ray) {
        return Err(MathError::GeometricFailure {
            operation: "rays may only appear at both ends of an edge chain".to_string(),
        });
    }

    let mut loop_points = Vec::with_capacity(n + 1);
    if open {
        loop_points.push(edges[0].far_point(points, ray_length));
        for i in 0..n - 1 {
            loop_points.push(points[shared(i, i + 1)?]);
        }
        loop_points.push(edges[n - 1].far_point(points, ray_length));
    } else {
        loop_points.push(points[shared(n - 1, 0)?]);
        for i in 0..n - 1 {
            loop_points.push(points[shared(i, i + 1)?]);
        }
    }
    Ok(loop_points)
}

/// Append-only point store that dedupes with tolerance equality.
///
/// Candidates are found through a grid of `epsilon` sized buckets; a lookup
/// checks the 3x3 neighbourhood and compares with `Point2D::nearly_equals`,
/// so the hash never decides equality on its own.
#[derive(Debug, Clone)]
pub struct PointPool {
    points: Vec<Point2D>,
    buckets: HashMap<(i64, i64), Vec<usize>>,
    epsilon: f64,
}

impl Default for PointPool {
    fn default() -> Self {
        Self::new(constants::EPSILON)
    }
}

impl PointPool {
    pub fn new(epsilon: f64) -> Self {
        Self {
            points: Vec::new(),
            buckets: HashMap::new(),
            epsilon: epsilon.max(f64::MIN_POSITIVE),
        }
    }

    fn bucket_of(&self, p: Point2D) -> (i64, i64) {
        (
            (p.x / self.epsilon).floor() as i64,
            (p.y / self.epsilon).floor() as i64,
        )
    }

    /// Index of an existing point within tolerance of `p`.
    pub fn find(&self, p: Point2D) -> Option<usize> {
        let (bx, by) = self.bucket_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(indices) = self.buckets.get(&(bx + dx, by + dy)) {
                    if let Some(&idx) = indices
                        .iter()
                        .find(|&&idx| self.points[idx].nearly_equals(p, self.epsilon))
                    {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    /// Index of `p`, inserting it when no equal point exists yet.
    pub fn insert(&mut self, p: Point2D) -> usize {
        if let Some(idx) = self.find(p) {
            return idx;
        }
        let idx = self.points.len();
        self.points.push(p);
        let key = self.bucket_of(p);
        self.buckets.entry(key).or_default().push(idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }
}
