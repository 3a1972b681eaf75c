// src/math/geometry/voronoi/capping.rs

//! Closes the unbounded cells of a Voronoi diagram against a circle.
//!
//! Every cell becomes a convex polygon inside a tessellated circle. The
//! capped cells are then rebuilt into a fresh diagram whose edges are all
//! segments; edges on the circle belong to a single cell.

use super::{
    config::{CappingConfig, RadiusHeuristic},
    diagram::VoronoiResult,
};
use crate::math::{
    algorithms::clipping::PolygonClipper,
    error::MathResult,
    geometry::{
        circle_cache::UnitCircleCache,
        edge::{Edge, PointPool},
    },
    types::{Bounds2D, Point2D},
    utils::{constants, simple_geometry, winding},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
pub struct VoronoiCapper {
    config: CappingConfig,
    circles: Arc<UnitCircleCache>,
    clipper: PolygonClipper,
}

impl Default for VoronoiCapper {
    fn default() -> Self {
        Self {
            config: CappingConfig::default(),
            circles: Arc::new(UnitCircleCache::new()),
            clipper: PolygonClipper::default(),
        }
    }
}

impl VoronoiCapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CappingConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares a circle cache with other cappers.
    pub fn with_circle_cache(mut self, circles: Arc<UnitCircleCache>) -> Self {
        self.circles = circles;
        self
    }

    pub fn config(&self) -> &CappingConfig {
        &self.config
    }

    /// Caps every cell of `diagram` to the polygon of `cap_circle`.
    ///
    /// Every control point lies inside that polygon, so no cell comes back
    /// empty. A diagram that is already fully bounded comes back unchanged.
    pub fn cap(&self, diagram: &VoronoiResult) -> MathResult<VoronoiResult> {
        self.config.validate()?;
        if diagram.is_fully_bounded() {
            return Ok(diagram.clone());
        }
        let sites = &diagram.control_points;
        if sites.is_empty() {
            return Ok(VoronoiResult {
                cell_edges: Some(Vec::new()),
                ..VoronoiResult::default()
            });
        }

        let (center, radius) = self.cap_circle(diagram);
        let circle = self.circles.circle(center, radius, self.config.circle_sides)?;
        let inner_radius = radius * self.inscribed_ratio();
        debug!(
            cells = sites.len(),
            radius,
            x = center.x,
            y = center.y,
            "capping voronoi diagram"
        );

        let mut polygons = Vec::with_capacity(sites.len());
        for (site, &control) in sites.iter().enumerate() {
            let members = diagram.edges_of_site(site);
            let bounded = !members.is_empty() && members.iter().all(|&e| diagram.edges[e].is_bounded());

            let polygon = if bounded {
                let outline = diagram.cell_polygon(site, radius)?;
                if outline.iter().all(|p| p.distance(center) <= inner_radius) {
                    Some(outline)
                } else {
                    trace!(site, "clipping bounded cell");
                    self.clipper.intersect(&outline, &circle)?
                }
            } else {
                let mut clipped = circle.clone();
                for &e in &members {
                    let edge = diagram.edges[e];
                    let a = diagram.edge_points[edge.start()];
                    let b = match edge {
                        Edge::Segment { p1, .. } => diagram.edge_points[p1],
                        _ => a + edge.direction(&diagram.edge_points),
                    };
                    clipped = if simple_geometry::orient(a, b, control) >= 0.0 {
                        self.clipper.clip_half_plane(&clipped, a, b)
                    } else {
                        self.clipper.clip_half_plane(&clipped, b, a)
                    };
                }
                (clipped.len() >= 3).then_some(clipped)
            };

            if polygon.is_none() {
                warn!(site, "capped cell is empty");
            }
            polygons.push(polygon.unwrap_or_default());
        }

        let result = rebuild(sites, polygons);
        debug!(
            edges = result.edges.len(),
            vertices = result.edge_points.len(),
            "voronoi diagram capped"
        );
        Ok(result)
    }

    /// Center and radius of the cap circle for `diagram`.
    ///
    /// Without a fixed center the circle sits at the center of the control
    /// point bounds. Without a fixed radius it follows the configured
    /// [`RadiusHeuristic`]:
    /// - `Enclosing`: the polygon's inscribed circle holds every control
    ///   point and finite vertex, plus the margin.
    /// - `Average`: mean control point distance plus the margin, grown if
    ///   needed until the polygon holds every control point.
    ///
    /// The margin is `margin_factor` times the smallest distance between an
    /// unbounded cell's site and its open edges.
    pub fn cap_circle(&self, diagram: &VoronoiResult) -> (Point2D, f64) {
        let center = self
            .config
            .center
            .unwrap_or_else(|| default_center(&diagram.control_points));
        let radius = self
            .config
            .radius
            .unwrap_or_else(|| self.estimate_radius(diagram, center));
        (center, radius)
    }

    /// Inscribed radius of the circle polygon relative to its circumradius.
    fn inscribed_ratio(&self) -> f64 {
        (constants::PI / self.config.circle_sides as f64).cos()
    }

    fn estimate_radius(&self, diagram: &VoronoiResult, center: Point2D) -> f64 {
        let sites = &diagram.control_points;
        let site_reach = sites
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f64::max)
            / self.inscribed_ratio();

        let min_unbound = diagram
            .edges
            .iter()
            .zip(&diagram.edge_sites)
            .filter(|(edge, _)| !edge.is_bounded())
            .flat_map(|(edge, &(a, b))| {
                [a, b].map(|s| edge.distance_to(&diagram.edge_points, diagram.control_points[s]))
            })
            .fold(f64::INFINITY, f64::min);
        let margin = if min_unbound.is_finite() {
            self.config.margin_factor * min_unbound
        } else {
            0.0
        };

        let radius = match self.config.radius_heuristic {
            RadiusHeuristic::Enclosing => {
                let vertex_reach = diagram
                    .edges
                    .iter()
                    .flat_map(Edge::point_indices)
                    .map(|i| diagram.edge_points[i].distance(center))
                    .fold(0.0, f64::max)
                    / self.inscribed_ratio();
                site_reach.max(vertex_reach) + margin
            }
            RadiusHeuristic::Average => {
                let average = sites.iter().map(|p| p.distance(center)).sum::<f64>()
                    / sites.len().max(1) as f64;
                (average + margin).max(site_reach)
            }
        };
        if radius > constants::EPSILON {
            radius
        } else {
            self.config.default_radius
        }
    }
}

fn default_center(sites: &[Point2D]) -> Point2D {
    Bounds2D::from_points_iter(sites.iter().copied()).map_or(Point2D::ZERO, |b| b.center())
}

/// Shares points and edges between the capped cell polygons.
fn rebuild(sites: &[Point2D], polygons: Vec<Vec<Point2D>>) -> VoronoiResult {
    let mut pool = PointPool::new(constants::EPSILON);
    let mut edges = Vec::new();
    let mut edge_sites: Vec<(usize, usize)> = Vec::new();
    let mut lookup: HashMap<(usize, usize), usize> = HashMap::new();
    let mut cells = Vec::with_capacity(polygons.len());

    for (site, mut polygon) in polygons.into_iter().enumerate() {
        winding::ensure_ccw(&mut polygon);
        let mut ring: Vec<usize> = polygon.iter().map(|&p| pool.insert(p)).collect();
        ring.dedup();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            cells.push(Vec::new());
            continue;
        }

        let mut cell = Vec::with_capacity(ring.len());
        for k in 0..ring.len() {
            let (u, v) = (ring[k], ring[(k + 1) % ring.len()]);
            let edge = *lookup.entry((u.min(v), u.max(v))).or_insert_with(|| {
                edges.push(Edge::segment(u, v));
                edge_sites.push((site, site));
                edges.len() - 1
            });
            if edge_sites[edge].0 != site {
                edge_sites[edge].1 = site;
            }
            cell.push(edge);
        }
        cells.push(cell);
    }

    VoronoiResult {
        control_points: sites.to_vec(),
        edge_points: pool.into_points(),
        edges,
        edge_sites,
        cell_edges: Some(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::voronoi::builder::VoronoiBuilder;
    use crate::math::types::points_from_tuples;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn circle_area(radius: f64, sides: usize) -> f64 {
        0.5 * sides as f64 * radius * radius * (constants::TAU / sides as f64).sin()
    }

    fn capped(points: &[Point2D], config: CappingConfig) -> VoronoiResult {
        let diagram = VoronoiBuilder::new().build(points).unwrap();
        VoronoiCapper::new().with_config(config).cap(&diagram).unwrap()
    }

    fn cell_area(result: &VoronoiResult, cell: usize) -> f64 {
        simple_geometry::signed_area(&result.cell_polygon(cell, 1.0).unwrap())
    }

    #[test]
    fn square_cells_are_quarter_circles() {
        let points = points_from_tuples(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = capped(&points, CappingConfig::new().with_radius(50.0).with_circle_sides(64));

        assert!(result.is_fully_bounded());
        assert_eq!(result.cell_count(), 4);
        let quarter = circle_area(50.0, 64) / 4.0;
        for (i, &site) in points.iter().enumerate() {
            let polygon = result.cell_polygon(i, 1.0).unwrap();
            assert!(simple_geometry::point_in_polygon(site, &polygon));
            assert_relative_eq!(cell_area(&result, i), quarter, max_relative = 1e-6);
        }
        let shared = result.edge_sites.iter().filter(|(a, b)| a != b).count();
        assert_eq!(shared, 4);
        assert!(result.edge_points.contains(&Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn estimated_radius_keeps_inner_cells() {
        let points =
            points_from_tuples(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)]);
        let diagram = VoronoiBuilder::new().build(&points).unwrap();
        let widen = 1.0 / (constants::PI / 64.0).cos();

        for (heuristic, radius) in [
            (RadiusHeuristic::Enclosing, 50.0f64.sqrt() * widen + 0.75 * 5.0),
            (RadiusHeuristic::Average, 0.8 * 50.0f64.sqrt() + 0.75 * 5.0),
        ] {
            let capper = VoronoiCapper::new()
                .with_config(CappingConfig::new().with_radius_heuristic(heuristic));
            let (center, estimated) = capper.cap_circle(&diagram);
            assert_eq!(center, Point2D::new(5.0, 5.0));
            assert_relative_eq!(estimated, radius, max_relative = 1e-9);

            let result = capper.cap(&diagram).unwrap();
            let total: f64 = (0..5).map(|i| cell_area(&result, i)).sum();
            assert_relative_eq!(total, circle_area(radius, 64), max_relative = 1e-6);
            assert_relative_eq!(cell_area(&result, 4), 50.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn far_vertices_do_not_empty_hull_cells() {
        // nearly collinear sites put the only vertex at (5, -119.95)
        let points = points_from_tuples(&[(0.0, 0.0), (10.0, 0.0), (4.0, 0.1)]);
        let diagram = VoronoiBuilder::new().build(&points).unwrap();
        assert_eq!(diagram.vertex_count(), 1);

        for heuristic in [RadiusHeuristic::Enclosing, RadiusHeuristic::Average] {
            let capper = VoronoiCapper::new()
                .with_config(CappingConfig::new().with_radius_heuristic(heuristic));
            let (center, _) = capper.cap_circle(&diagram);
            assert_eq!(center, Point2D::new(5.0, 0.05));

            let result = capper.cap(&diagram).unwrap();
            assert!(result.is_fully_bounded());
            for (i, &site) in points.iter().enumerate() {
                let polygon = result.cell_polygon(i, 1.0).unwrap();
                assert!(polygon.len() >= 3, "cell {i} is empty with {heuristic:?}");
                assert!(simple_geometry::point_in_polygon(site, &polygon));
            }
            assert_eq!(capper.cap(&result).unwrap(), result);
        }
    }

    #[test]
    fn random_diagrams_tile_the_cap_circle() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..20 {
            let count = rng.random_range(3..40);
            let points: Vec<Point2D> = (0..count)
                .map(|_| Point2D::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
                .collect();
            let diagram = VoronoiBuilder::new().build(&points).unwrap();
            let capper = VoronoiCapper::new();
            let (_, radius) = capper.cap_circle(&diagram);

            let once = capper.cap(&diagram).unwrap();
            assert!(once.is_fully_bounded());
            let mut total = 0.0;
            for (i, &site) in points.iter().enumerate() {
                let polygon = once.cell_polygon(i, 1.0).unwrap();
                assert!(polygon.len() >= 3);
                assert!(simple_geometry::point_in_polygon(site, &polygon));
                total += cell_area(&once, i);
            }
            assert_relative_eq!(total, circle_area(radius, 64), max_relative = 1e-6);
            assert_eq!(capper.cap(&once).unwrap(), once);
        }
    }

    #[test]
    fn capping_is_idempotent() {
        let points = points_from_tuples(&[(0.0, 0.0), (4.0, 0.0), (1.0, 3.0), (5.0, 4.0)]);
        let once = capped(&points, CappingConfig::new());
        let twice = VoronoiCapper::new().cap(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn single_site_gets_the_whole_circle() {
        let point = [Point2D::new(3.0, -2.0)];
        let result = capped(&point, CappingConfig::new());
        assert_eq!(result.edges.len(), 64);
        assert_relative_eq!(cell_area(&result, 0), circle_area(1.0, 64), max_relative = 1e-9);

        let result = capped(&point, CappingConfig::new().with_radius(3.0).with_circle_sides(12));
        assert_eq!(result.edges.len(), 12);
        assert_relative_eq!(cell_area(&result, 0), circle_area(3.0, 12), max_relative = 1e-9);
    }

    #[test]
    fn two_sites_split_the_circle_in_halves() {
        let points = points_from_tuples(&[(0.0, 0.0), (4.0, 0.0)]);
        let diagram = VoronoiBuilder::new().build(&points).unwrap();
        let capper = VoronoiCapper::new();
        let (center, radius) = capper.cap_circle(&diagram);
        assert_eq!(center, Point2D::new(2.0, 0.0));
        assert_relative_eq!(radius, 2.0 / (constants::PI / 64.0).cos() + 1.5, max_relative = 1e-9);

        let result = capper.cap(&diagram).unwrap();
        let half = circle_area(radius, 64) / 2.0;
        assert_relative_eq!(cell_area(&result, 0), half, max_relative = 1e-6);
        assert_relative_eq!(cell_area(&result, 1), half, max_relative = 1e-6);
    }

    #[test]
    fn collinear_sites_become_strips() {
        let points = points_from_tuples(&[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0)]);
        let result = capped(&points, CappingConfig::new().with_radius(10.0).with_center(Point2D::new(2.0, 0.0)));
        assert!(result.is_fully_bounded());
        let areas: Vec<f64> = (0..3).map(|i| cell_area(&result, i)).collect();
        assert_relative_eq!(areas.iter().sum::<f64>(), circle_area(10.0, 64), max_relative = 1e-6);
        assert_relative_eq!(areas[0], areas[2], max_relative = 1e-6);
        let middle = result.cell_polygon(1, 1.0).unwrap();
        assert!(middle.iter().all(|p| (p.x - 2.0).abs() <= 1.0 + 1e-9));
    }

    #[test]
    fn empty_diagram_stays_empty() {
        let result = VoronoiCapper::new().cap(&VoronoiResult::default()).unwrap();
        assert_eq!(result.cell_edges, Some(vec![]));
        assert!(result.edges.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let diagram = VoronoiBuilder::new().build(&[Point2D::new(0.0, 0.0)]).unwrap();
        let capper = VoronoiCapper::new().with_config(CappingConfig::new().with_circle_sides(2));
        assert!(capper.cap(&diagram).is_err());
    }
}
