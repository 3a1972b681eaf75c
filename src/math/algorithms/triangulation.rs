// src/math/algorithms/triangulation.rs

//! Delaunay-Triangulation einer Punktmenge (Bowyer-Watson).
//!
//! Points are inserted in x-sorted order into a mesh seeded with a large
//! enclosing super-triangle. Triangles whose circumcircle lies entirely to
//! the left of the current point can never be invalidated again and are
//! moved out of the working set early.

use crate::math::{
    error::{MathError, MathResult},
    types::{Bounds2D, Point2D},
    utils::{constants, simple_geometry},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Settings of the Delaunay triangulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelaunayConfig {
    /// Hard upper bound on the number of input points.
    pub max_points: usize,
    /// Boundary-edge ratio above which `prune_thin_boundary` drops a triangle.
    pub thin_edge_ratio: f64,
    /// Prune thin hull triangles with `thin_edge_ratio` after triangulating.
    pub prune_thin: bool,
    /// Size of the super-triangle relative to the input extent.
    pub super_triangle_scale: f64,
}

impl Default for DelaunayConfig {
    /// Default values:
    /// - `max_points`: 16384
    /// - `thin_edge_ratio`: 0.98
    /// - `prune_thin`: false
    /// - `super_triangle_scale`: 1e5
    fn default() -> Self {
        Self {
            max_points: 16384,
            thin_edge_ratio: 0.98,
            prune_thin: false,
            super_triangle_scale: 1e5,
        }
    }
}

impl DelaunayConfig {
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_thin_edge_ratio(mut self, ratio: f64) -> Self {
        self.thin_edge_ratio = ratio;
        self
    }

    pub fn with_thin_pruning(mut self, prune: bool) -> Self {
        self.prune_thin = prune;
        self
    }

    pub fn with_super_triangle_scale(mut self, scale: f64) -> Self {
        self.super_triangle_scale = scale;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if self.max_points == 0 {
            return Err(MathError::InvalidConfiguration {
                message: "max_points must be greater than zero".to_string(),
            });
        }
        if !(self.thin_edge_ratio > 0.0 && self.thin_edge_ratio <= 1.0) {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "thin_edge_ratio must be in (0, 1], got {}",
                    self.thin_edge_ratio
                ),
            });
        }
        if !(self.super_triangle_scale.is_finite() && self.super_triangle_scale >= 10.0) {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "super_triangle_scale must be at least 10, got {}",
                    self.super_triangle_scale
                ),
            });
        }
        Ok(())
    }
}

/// Umkreis eines Dreiecks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circumcircle {
    pub center: Point2D,
    pub radius_squared: f64,
    /// The three points are nearly collinear; center and radius are unreliable.
    pub thin: bool,
}

impl Circumcircle {
    /// Strict containment: points on the circle are outside.
    #[inline]
    pub fn contains(&self, p: Point2D) -> bool {
        self.center.distance_squared(p) < self.radius_squared
    }

    pub fn radius(&self) -> f64 {
        self.radius_squared.sqrt()
    }
}

/// Circumcircle through `a`, `b` and `c`.
///
/// Solved relative to `a` to keep the magnitudes small. Returns `None` for
/// exactly collinear input; nearly collinear input is returned with
/// `thin = true`.
pub fn circumcircle(a: Point2D, b: Point2D, c: Point2D) -> Option<Circumcircle> {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.cross(ac);
    if cross == 0.0 {
        return None;
    }
    let d = 2.0 * cross;
    let ab_sq = ab.length_squared();
    let ac_sq = ac.length_squared();
    let offset = Point2D::new(
        (ac.y * ab_sq - ab.y * ac_sq) / d,
        (ab.x * ac_sq - ac.x * ab_sq) / d,
    );
    if !offset.is_finite() {
        return None;
    }
    Some(Circumcircle {
        center: a + offset,
        radius_squared: offset.length_squared(),
        thin: cross.abs() <= 1e-10 * ab.length() * ac.length(),
    })
}

/// Triangle with indices into the shared point array.
///
/// Vertices wind counter-clockwise. `neighbors[k]` is the triangle across
/// the edge opposite `vertices[k]`, or `None` on the hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub neighbors: [Option<usize>; 3],
    pub circumcircle: Circumcircle,
}

impl Triangle {
    /// Directed edge opposite `vertices[k]`.
    #[inline]
    pub fn edge(&self, k: usize) -> (usize, usize) {
        (self.vertices[(k + 1) % 3], self.vertices[(k + 2) % 3])
    }

    pub fn area(&self, points: &[Point2D]) -> f64 {
        let [a, b, c] = self.vertices;
        0.5 * simple_geometry::orient(points[a], points[b], points[c]).abs()
    }

    pub fn contains_vertex(&self, index: usize) -> bool {
        self.vertices.contains(&index)
    }
}

/// Ergebnis einer Delaunay-Triangulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangulation {
    pub points: Vec<Point2D>,
    pub triangles: Vec<Triangle>,
}

impl Triangulation {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All undirected edges as `(min, max)` pairs, sorted.
    pub fn unique_edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .triangles
            .iter()
            .flat_map(|t| (0..3).map(move |k| t.edge(k)))
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Directed edges without a neighbor, in triangle order.
    pub fn hull_edges(&self) -> Vec<(usize, usize)> {
        self.triangles
            .iter()
            .flat_map(|t| {
                (0..3)
                    .filter(move |&k| t.neighbors[k].is_none())
                    .map(move |k| t.edge(k))
            })
            .collect()
    }

    pub fn total_area(&self) -> f64 {
        self.triangles.iter().map(|t| t.area(&self.points)).sum()
    }

    /// Repeatedly removes hull triangles whose hull edge is almost as long as
    /// the other two edges together (`hull / (e1 + e2) > ratio`).
    ///
    /// Returns the number of removed triangles.
    pub fn prune_thin_boundary(&mut self, ratio: f64) -> usize {
        let mut removed = 0;
        loop {
            let points = &self.points;
            let before = self.triangles.len();
            self.triangles.retain(|t| !is_thin_boundary(t, points, ratio));
            let dropped = before - self.triangles.len();
            if dropped == 0 {
                break;
            }
            removed += dropped;
            self.link_neighbors();
        }
        if removed > 0 {
            debug!(removed, remaining = self.triangles.len(), "pruned thin boundary triangles");
        }
        removed
    }

    /// Recomputes `neighbors` from shared directed edges.
    fn link_neighbors(&mut self) {
        let owners: HashMap<(usize, usize), usize> = self
            .triangles
            .iter()
            .enumerate()
            .flat_map(|(i, t)| (0..3).map(move |k| (t.edge(k), i)))
            .collect();
        for t in &mut self.triangles {
            for k in 0..3 {
                let (a, b) = t.edge(k);
                t.neighbors[k] = owners.get(&(b, a)).copied();
            }
        }
    }
}

fn is_thin_boundary(t: &Triangle, points: &[Point2D], ratio: f64) -> bool {
    (0..3).filter(|&k| t.neighbors[k].is_none()).any(|k| {
        let [a, b, c] = [
            points[t.vertices[k]],
            points[t.vertices[(k + 1) % 3]],
            points[t.vertices[(k + 2) % 3]],
        ];
        let others = a.distance(b) + a.distance(c);
        others > 0.0 && b.distance(c) / others > ratio
    })
}

/// Working triangle of the incremental construction.
#[derive(Debug, Clone, Copy)]
struct WorkTriangle {
    vertices: [usize; 3],
    circle: Circumcircle,
}

impl WorkTriangle {
    fn new(points: &[Point2D], [a, b, c]: [usize; 3]) -> Option<Self> {
        let vertices = if simple_geometry::orient(points[a], points[b], points[c]) < 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        };
        let circle = circumcircle(points[vertices[0]], points[vertices[1]], points[vertices[2]])?;
        Some(Self { vertices, circle })
    }
}

/// Incremental Delaunay triangulator.
#[derive(Debug, Clone, Default)]
pub struct DelaunayTriangulator {
    config: DelaunayConfig,
}

impl DelaunayTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DelaunayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DelaunayConfig {
        &self.config
    }

    /// Unique undirected edges of the triangulation of `points`.
    pub fn edges(&self, points: &[Point2D]) -> MathResult<Vec<(usize, usize)>> {
        Ok(self.triangulate(points)?.unique_edges())
    }

    /// Triangulates `points`. Duplicates and more than `max_points` points
    /// are rejected; fewer than three points or collinear input yield an
    /// empty triangle list.
    pub fn triangulate(&self, points: &[Point2D]) -> MathResult<Triangulation> {
        self.config.validate()?;
        let n = points.len();
        if n > self.config.max_points {
            return Err(MathError::CapacityExceeded {
                limit: self.config.max_points,
                actual: n,
            });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| {
            points[i]
                .x
                .total_cmp(&points[j].x)
                .then(points[i].y.total_cmp(&points[j].y))
        });
        if let Some((first, second)) = simple_geometry::first_duplicate(points, &order, |p| p.x) {
            return Err(MathError::DuplicatePoint { first, second });
        }

        let empty = Triangulation {
            points: points.to_vec(),
            triangles: Vec::new(),
        };
        let Some(bounds) = Bounds2D::from_points_iter(points.iter().copied()) else {
            return Ok(empty);
        };
        if n < 3 {
            return Ok(empty);
        }

        // Super triangle well around all points
        let s = bounds.max_extent().max(constants::EPSILON) * self.config.super_triangle_scale;
        let c = bounds.center();
        let mut vertices = points.to_vec();
        vertices.extend([
            c + Point2D::new(-2.0 * s, -s),
            c + Point2D::new(2.0 * s, -s),
            c + Point2D::new(0.0, 2.0 * s),
        ]);
        let Some(super_triangle) = WorkTriangle::new(&vertices, [n, n + 1, n + 2]) else {
            return Err(MathError::GeometricFailure {
                operation: "super-triangle circumcircle".to_string(),
            });
        };

        let mut open = vec![super_triangle];
        let mut closed: Vec<WorkTriangle> = Vec::new();
        let mut cavity: Vec<(usize, usize)> = Vec::new();
        let mut skipped = 0usize;

        for &i in &order {
            let p = vertices[i];
            cavity.clear();

            let mut k = 0;
            while k < open.len() {
                let tri = open[k];
                let dx = p.x - tri.circle.center.x;
                if dx > 0.0 && dx * dx > tri.circle.radius_squared {
                    closed.push(open.swap_remove(k));
                } else if tri.circle.contains(p) {
                    let [a, b, c] = tri.vertices;
                    cavity.extend([(a, b), (b, c), (c, a)]);
                    open.swap_remove(k);
                } else {
                    k += 1;
                }
            }

            // Edges shared by two removed triangles are interior
            let directed: HashSet<(usize, usize)> = cavity.iter().copied().collect();
            for &(a, b) in &cavity {
                if directed.contains(&(b, a)) {
                    continue;
                }
                match WorkTriangle::new(&vertices, [a, b, i]) {
                    Some(t) => open.push(t),
                    None => {
                        skipped += 1;
                        warn!(a, b, point = i, "skipping degenerate triangle");
                    }
                }
            }
        }
        closed.extend(open);

        let triangles: Vec<Triangle> = closed
            .into_iter()
            .filter(|t| t.vertices.iter().all(|&v| v < n))
            .map(|t| Triangle {
                vertices: t.vertices,
                neighbors: [None; 3],
                circumcircle: t.circle,
            })
            .collect();

        let mut triangulation = Triangulation {
            points: points.to_vec(),
            triangles,
        };
        triangulation.link_neighbors();
        if self.config.prune_thin {
            triangulation.prune_thin_boundary(self.config.thin_edge_ratio);
        }
        debug!(
            points = n,
            triangles = triangulation.len(),
            skipped,
            "delaunay triangulation"
        );
        Ok(triangulation)
    }
}
