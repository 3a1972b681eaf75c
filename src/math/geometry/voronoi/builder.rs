// src/math/geometry/voronoi/builder.rs

//! Fortune's sweepline algorithm.
//!
//! The sweepline moves towards increasing y. Every Voronoi edge separates
//! two sites `a` and `b` and has two ends: end B grows in direction
//! `perp(b - a)`, end A in the opposite direction. A breakpoint of the
//! beachline traces exactly one end of one edge until a circle event pins
//! it to a vertex; ends still traced when the queue runs dry are infinite.

use super::{
    beachline::{Beachline, Breakpoint, COORDINATE_PRECISION, EdgeEnd, NodeId},
    config::VoronoiConfig,
    diagram::VoronoiResult,
    events::{EventKind, EventQueue},
};
use crate::math::{
    error::{MathError, MathResult},
    geometry::edge::Edge,
    types::Point2D,
    utils::{constants, simple_geometry, union_find::DisjointSet},
};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndState {
    /// Still traced by a breakpoint.
    Pending,
    Finite(usize),
    Infinite,
}

#[derive(Debug, Clone, Copy)]
struct SweepEdge {
    a: usize,
    b: usize,
    ends: [EndState; 2],
}

impl SweepEdge {
    fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            ends: [EndState::Pending; 2],
        }
    }
}

/// Builds Voronoi diagrams from point sets.
#[derive(Debug, Clone, Default)]
pub struct VoronoiBuilder {
    config: VoronoiConfig,
}

impl VoronoiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: VoronoiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    /// Voronoi diagram of `points`.
    ///
    /// Duplicate points are rejected. Zero points give an empty diagram,
    /// one point a diagram without edges and collinear points a set of
    /// parallel lines.
    pub fn build(&self, points: &[Point2D]) -> MathResult<VoronoiResult> {
        self.config.validate()?;
        debug!(points = points.len(), "computing voronoi diagram");

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&i, &j| {
            points[i]
                .y
                .total_cmp(&points[j].y)
                .then(points[i].x.total_cmp(&points[j].x))
        });
        if let Some((first, second)) = simple_geometry::first_duplicate(points, &order, |p| p.y) {
            return Err(MathError::DuplicatePoint { first, second });
        }

        let mut sweep = Sweep::new(points);
        for &site in &order {
            sweep.queue.push_site(site, points[site]);
        }
        sweep.run()?;

        let mut result = sweep.finish();
        if self.config.compute_cell_edges {
            result.compute_cell_edges()?;
        }
        debug!(
            cells = result.cell_count(),
            edges = result.edges.len(),
            vertices = result.vertex_count(),
            "voronoi diagram done"
        );
        Ok(result)
    }
}

/// Scratch state of one sweep.
struct Sweep<'a> {
    sites: &'a [Point2D],
    beachline: Beachline,
    queue: EventQueue,
    edges: Vec<SweepEdge>,
    vertices: Vec<Point2D>,
    vertex_keys: HashMap<(i64, i64), usize>,
    /// y of the lowest site while only sites of that row have been seen.
    first_row: Option<f64>,
}

impl<'a> Sweep<'a> {
    fn new(sites: &'a [Point2D]) -> Self {
        Self {
            sites,
            beachline: Beachline::new(),
            queue: EventQueue::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
            vertex_keys: HashMap::new(),
            first_row: None,
        }
    }

    fn run(&mut self) -> MathResult<()> {
        while let Some(event) = self.queue.pop() {
            match event.kind {
                EventKind::Site { site } => {
                    trace!(site, y = event.y, "site event");
                    self.handle_site(site)?;
                }
                EventKind::Circle { arc, center } => {
                    if self.beachline.circle_event(arc) != Some(event.id) {
                        continue;
                    }
                    trace!(arc, y = event.y, x = center.x, "circle event");
                    self.handle_circle(arc, center, event.y)?;
                }
            }
        }
        Ok(())
    }

    fn handle_site(&mut self, site: usize) -> MathResult<()> {
        let position = self.sites[site];
        if self.beachline.is_empty() {
            self.beachline.insert_first(site);
            self.first_row = Some(position.y);
            return Ok(());
        }

        // Every site so far lies on one row: the edges are vertical
        if let Some(row_y) = self.first_row {
            let arc = self
                .beachline
                .rightmost_arc()
                .ok_or_else(|| MathError::InvariantViolation {
                    context: "beachline has no arcs".to_string(),
                })?;
            let left = self.site_of(arc)?;
            if (position.y - row_y).abs() <= constants::EPSILON && position.x > self.sites[left].x {
                let edge = self.push_edge(left, site);
                // Below the first row nothing else happens.
                self.edges[edge].ends[EdgeEnd::A.index()] = EndState::Infinite;
                self.beachline.split_first_row(arc, site, edge)?;
                return Ok(());
            }
            self.first_row = None;
        }

        let arc = self
            .beachline
            .arc_above(self.sites, position.x, position.y)
            .ok_or_else(|| MathError::InvariantViolation {
                context: format!("no arc above site {}", site),
            })?;
        self.invalidate(arc);
        let split = self.site_of(arc)?;
        let edge = self.push_edge(split, site);
        let [left, _, right] = self.beachline.split_arc(arc, site, edge)?;
        self.check_circle(left);
        self.check_circle(right);
        Ok(())
    }

    fn handle_circle(&mut self, arc: NodeId, center: Point2D, sweep_y: f64) -> MathResult<()> {
        let around = self
            .beachline
            .neighbors(arc)
            .ok_or_else(|| MathError::InvariantViolation {
                context: format!("vanishing arc {} lacks a neighbour", arc),
            })?;
        self.invalidate(around.left_arc);
        self.invalidate(around.right_arc);
        self.beachline.set_circle_event(arc, None);

        let vertex = self.vertex_at(center);
        for node in [around.predecessor, around.successor] {
            let bp = self.breakpoint_of(node)?;
            self.edges[bp.edge].ends[bp.end.index()] = EndState::Finite(vertex);
        }

        let left_site = self.site_of(around.left_arc)?;
        let right_site = self.site_of(around.right_arc)?;
        let edge = self.push_edge(left_site, right_site);
        self.edges[edge].ends[EdgeEnd::A.index()] = EndState::Finite(vertex);
        self.beachline.remove_arc(
            arc,
            Breakpoint {
                left_site,
                right_site,
                edge,
                end: EdgeEnd::B,
            },
        )?;

        trace!(vertex, sweep_y, "voronoi vertex");
        self.check_circle(around.left_arc);
        self.check_circle(around.right_arc);
        Ok(())
    }

    /// Queues the collapse of `arc` if its neighbours converge on it.
    fn check_circle(&mut self, arc: NodeId) {
        let (Some(left), Some(right)) = (self.beachline.prev_arc(arc), self.beachline.next_arc(arc))
        else {
            return;
        };
        let (Some(l), Some(m), Some(r)) = (
            self.beachline.site(left),
            self.beachline.site(arc),
            self.beachline.site(right),
        ) else {
            return;
        };
        if l == r {
            return;
        }

        let (pl, pm, pr) = (self.sites[l], self.sites[m], self.sites[r]);
        let first = pm - pl;
        let second = pr - pm;
        if first.cross(second) <= constants::EPSILON_SQUARED * first.length() * second.length() {
            return; // breakpoints diverge
        }
        let Some(center) = circumcenter(pl, pm, pr) else {
            return;
        };
        let radius = center.distance(pm);
        let id = self.queue.push_circle(arc, center, radius);
        self.beachline.set_circle_event(arc, Some(id));
    }

    fn invalidate(&mut self, arc: NodeId) {
        if let Some(id) = self.beachline.circle_event(arc) {
            self.queue.invalidate(id);
            self.beachline.set_circle_event(arc, None);
        }
    }

    fn push_edge(&mut self, a: usize, b: usize) -> usize {
        self.edges.push(SweepEdge::new(a, b));
        self.edges.len() - 1
    }

    /// Vertex index for `p`; coincident circle events share one vertex.
    fn vertex_at(&mut self, p: Point2D) -> usize {
        let key = (
            (p.x / COORDINATE_PRECISION).round() as i64,
            (p.y / COORDINATE_PRECISION).round() as i64,
        );
        *self.vertex_keys.entry(key).or_insert_with(|| {
            self.vertices.push(p);
            self.vertices.len() - 1
        })
    }

    fn site_of(&self, arc: NodeId) -> MathResult<usize> {
        self.beachline
            .site(arc)
            .ok_or_else(|| MathError::InvariantViolation {
                context: format!("beachline node {} is not an arc", arc),
            })
    }

    fn breakpoint_of(&self, node: NodeId) -> MathResult<Breakpoint> {
        self.beachline
            .breakpoint(node)
            .ok_or_else(|| MathError::InvariantViolation {
                context: format!("beachline node {} is not a breakpoint", node),
            })
    }

    /// Closes open ends, merges coincident vertices and converts the edge
    /// records into segments, rays and lines.
    fn finish(self) -> VoronoiResult {
        let Sweep {
            sites,
            edges,
            vertices,
            ..
        } = self;

        let mut edges: Vec<SweepEdge> = edges
            .into_iter()
            .map(|mut e| {
                for end in &mut e.ends {
                    if *end == EndState::Pending {
                        *end = EndState::Infinite;
                    }
                }
                // Finite end first
                if let [EndState::Infinite, EndState::Finite(_)] = e.ends {
                    std::mem::swap(&mut e.a, &mut e.b);
                    e.ends.swap(0, 1);
                }
                e
            })
            .collect();

        // Zero-length edges join their two vertices into one.
        let mut merged = DisjointSet::new(vertices.len());
        for e in &edges {
            if let [EndState::Finite(u), EndState::Finite(v)] = e.ends {
                if vertices[u].distance(vertices[v]) <= constants::EPSILON {
                    merged.union(u, v);
                }
            }
        }
        for e in &mut edges {
            for end in &mut e.ends {
                if let EndState::Finite(v) = *end {
                    *end = EndState::Finite(merged.find(v));
                }
            }
        }
        edges.retain(|e| !matches!(e.ends, [EndState::Finite(u), EndState::Finite(v)] if u == v));

        // Compact the surviving vertices, then append line anchors.
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut edge_points = Vec::new();
        let mut index_of = |v: usize, edge_points: &mut Vec<Point2D>| -> usize {
            *remap.entry(v).or_insert_with(|| {
                edge_points.push(vertices[v]);
                edge_points.len() - 1
            })
        };

        let mut out_edges = Vec::with_capacity(edges.len());
        let mut edge_sites = Vec::with_capacity(edges.len());
        for e in &edges {
            let direction = (sites[e.b] - sites[e.a]).perp().normalize_or_zero();
            let edge = match e.ends {
                [EndState::Finite(u), EndState::Finite(v)] => {
                    Edge::segment(index_of(u, &mut edge_points), index_of(v, &mut edge_points))
                }
                [EndState::Finite(u), _] => Edge::ray(index_of(u, &mut edge_points), direction),
                _ => {
                    edge_points.push(sites[e.a].midpoint(sites[e.b]));
                    Edge::line(edge_points.len() - 1, direction)
                }
            };
            out_edges.push(edge);
            edge_sites.push((e.a, e.b));
        }

        VoronoiResult {
            control_points: sites.to_vec(),
            edge_points,
            edges: out_edges,
            edge_sites,
            cell_edges: None,
        }
    }
}

/// Center of the circle through three points, `None` if they are collinear.
fn circumcenter(a: Point2D, b: Point2D, c: Point2D) -> Option<Point2D> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.cross(ac);
    if d == 0.0 {
        return None;
    }
    let ab_sq = ab.length_squared();
    let ac_sq = ac.length_squared();
    let center = a + Point2D::new(
        (ac.y * ab_sq - ab.y * ac_sq) / d,
        (ab.x * ac_sq - ac.x * ab_sq) / d,
    );
    center.is_finite().then_some(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::points_from_tuples;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn build(points: &[Point2D]) -> VoronoiResult {
        VoronoiBuilder::new().build(points).unwrap()
    }

    /// Control points adjacent to each vertex.
    fn vertex_sites(result: &VoronoiResult) -> HashMap<usize, Vec<usize>> {
        let mut map: HashMap<usize, Vec<usize>> = HashMap::new();
        for (edge, &(a, b)) in result.edges.iter().zip(&result.edge_sites) {
            for v in edge.point_indices() {
                let entry = map.entry(v).or_default();
                entry.extend([a, b]);
                entry.sort_unstable();
                entry.dedup();
            }
        }
        map
    }

    #[test]
    fn square_corners_meet_in_the_center() {
        let points = points_from_tuples(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = build(&points);
        assert_eq!(result.vertex_count(), 1);
        assert_eq!(result.edges.len(), 4);
        assert!(result.edges.iter().all(Edge::is_ray));
        assert_eq!(result.edge_points[0], Point2D::new(5.0, 5.0));
        // Rays point away from the square's center.
        for (edge, &(a, b)) in result.edges.iter().zip(&result.edge_sites) {
            let mid = points[a].midpoint(points[b]);
            assert!(edge.direction(&result.edge_points).dot(mid - Point2D::new(5.0, 5.0)) > 0.0);
        }
    }

    #[test]
    fn random_diagrams_are_consistent() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let count = rng.random_range(3..60);
            let points: Vec<Point2D> = (0..count)
                .map(|_| Point2D::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
                .collect();
            let result = build(&points);
            assert_eq!(result.cell_count(), points.len());

            for (v, sites) in vertex_sites(&result) {
                assert!(sites.len() >= 3, "vertex {} touches {:?}", v, sites);
                let p = result.edge_points[v];
                let d0 = p.distance(points[sites[0]]);
                for &s in &sites {
                    assert_relative_eq!(p.distance(points[s]), d0, max_relative = 1e-6);
                }
                let nearest = points.iter().map(|q| q.distance(p)).fold(f64::INFINITY, f64::min);
                assert_relative_eq!(nearest, d0, max_relative = 1e-6);
            }

            let cells = result.cell_edges.as_ref().unwrap();
            assert_eq!(cells.len(), points.len());
            assert!(cells.iter().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn integer_grid_with_cocircular_sites() {
        let mut points = Vec::new();
        for x in 0..5 {
            for y in 0..4 {
                points.push(Point2D::new(x as f64, y as f64));
            }
        }
        let result = build(&points);
        // Interior vertices of a 5x4 grid: 4 * 3.
        assert_eq!(result.vertex_count(), 12);
        assert_eq!(result.cell_edges.as_ref().unwrap().len(), 20);
        let bounded = result.edges.iter().filter(|e| e.is_bounded()).count();
        assert_eq!(bounded, 3 * 3 + 4 * 2);
    }

    #[test]
    fn collinear_sites_give_parallel_lines() {
        for points in [
            points_from_tuples(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (5.0, 0.0)]),
            points_from_tuples(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]),
            points_from_tuples(&[(3.0, 3.0), (0.0, 0.0), (2.0, 2.0), (1.0, 1.0)]),
        ] {
            let result = build(&points);
            assert_eq!(result.edges.len(), points.len() - 1);
            assert!(result.edges.iter().all(Edge::is_line));
            for (edge, &(a, b)) in result.edges.iter().zip(&result.edge_sites) {
                let anchor = result.edge_points[edge.start()];
                assert_relative_eq!(anchor.distance(points[a]), anchor.distance(points[b]));
            }
        }
    }

    #[test]
    fn tiny_inputs() {
        assert_eq!(build(&[]).edges.len(), 0);
        let single = build(&[Point2D::new(1.0, 2.0)]);
        assert!(single.edges.is_empty());
        assert_eq!(single.cell_edges, Some(vec![vec![]]));
        let pair = build(&points_from_tuples(&[(0.0, 0.0), (2.0, 1.0)]));
        assert_eq!(pair.edges.len(), 1);
        assert!(pair.edges[0].is_line());
    }

    #[test]
    fn triangle_has_one_vertex_and_three_rays() {
        let points = points_from_tuples(&[(0.0, 0.0), (4.0, 0.0), (1.0, 1.0)]);
        let result = build(&points);
        assert_eq!(result.vertex_count(), 1);
        assert_eq!(result.edge_points[0], Point2D::new(2.0, -1.0));
        assert_eq!(result.edges.iter().filter(|e| e.is_ray()).count(), 3);
    }

    #[test]
    fn duplicates_are_rejected() {
        let points = points_from_tuples(&[(0.0, 0.0), (3.0, 1.0), (3.0, 1.0 + 1e-9)]);
        assert_eq!(
            VoronoiBuilder::new().build(&points),
            Err(MathError::DuplicatePoint { first: 1, second: 2 })
        );
    }

    #[test]
    fn cell_edges_can_be_skipped() {
        let builder = VoronoiBuilder::new().with_config(VoronoiConfig::new().with_cell_edges(false));
        let result = builder
            .build(&points_from_tuples(&[(0.0, 0.0), (4.0, 0.0), (1.0, 1.0)]))
            .unwrap();
        assert!(result.cell_edges.is_none());
        assert_eq!(result.cell_polygon(0, 5.0).unwrap().len(), 3);
    }
}
