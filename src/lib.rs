// ./src/lib.rs

//! Planar computational geometry: convex hulls, Delaunay triangulation,
//! Voronoi diagrams and polygon clipping.
//!
//! The free functions below are the flat entry points. Each one runs with
//! default configuration; the builder types in [`math`] expose the tunables.

pub mod math;

use math::{
    algorithms::{
        ConvexHull, ConvexHullComputer, DelaunayTriangulator, PolygonBooleanOps, PolygonClipper,
        Triangulation,
    },
    error::MathResult,
    geometry::{PolygonWithHoles, VoronoiBuilder, VoronoiCapper, VoronoiConfig, VoronoiResult},
    types::Point2D,
};

/// Convex hull of `points`, counter-clockwise from the point of minimal X.
pub fn convex_hull(points: &[Point2D]) -> ConvexHull {
    ConvexHullComputer::new().compute(points)
}

pub fn delaunay_triangulate(points: &[Point2D]) -> MathResult<Triangulation> {
    DelaunayTriangulator::new().triangulate(points)
}

/// Unique edges of the Delaunay triangulation as index pairs.
pub fn delaunay_edges(points: &[Point2D]) -> MathResult<Vec<(usize, usize)>> {
    DelaunayTriangulator::new().edges(points)
}

/// Voronoi diagram of `points`; `cell_edges` selects whether the ordered
/// per-cell edge lists are computed.
pub fn compute_voronoi(points: &[Point2D], cell_edges: bool) -> MathResult<VoronoiResult> {
    VoronoiBuilder::new()
        .with_config(VoronoiConfig::new().with_cell_edges(cell_edges))
        .build(points)
}

/// Closes every cell of `diagram` against a circle around it.
pub fn cap_voronoi_to_circle(diagram: &VoronoiResult) -> MathResult<VoronoiResult> {
    VoronoiCapper::new().cap(diagram)
}

/// Intersection of `subject` with the convex polygon `clip`, `None` if they
/// only touch or are disjoint.
pub fn intersect_polygons(subject: &[Point2D], clip: &[Point2D]) -> MathResult<Option<Vec<Point2D>>> {
    PolygonClipper::new().intersect(subject, clip)
}

pub fn union_polygons(polygons: &[Vec<Point2D>]) -> MathResult<Vec<PolygonWithHoles>> {
    PolygonBooleanOps::new().union(polygons)
}

/// Containment roots among non-intersecting polygons, each with the
/// indices of every polygon nested inside it.
pub fn find_polygon_islands(polygons: &[Vec<Point2D>]) -> Vec<(usize, Vec<usize>)> {
    math::algorithms::find_polygon_islands(polygons)
}
