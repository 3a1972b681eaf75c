// src/math/geometry/voronoi/diagram.rs

use crate::math::{
    error::{MathError, MathResult},
    geometry::edge::{Edge, polygon_from_edge_chain},
    types::{Bounds2D, Point2D},
    utils::simple_geometry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of a Voronoi computation.
///
/// `edges` index into `edge_points`. `edge_sites[e]` names the two control
/// points separated by edge `e`; edges on the cap circle of a capped diagram
/// name their single cell twice. `cell_edges[i]`, when computed, lists the
/// edges bounding the cell of control point `i` as a connected chain in
/// counter-clockwise order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoronoiResult {
    pub control_points: Vec<Point2D>,
    pub edge_points: Vec<Point2D>,
    pub edges: Vec<Edge>,
    pub edge_sites: Vec<(usize, usize)>,
    pub cell_edges: Option<Vec<Vec<usize>>>,
}

impl VoronoiResult {
    pub fn cell_count(&self) -> usize {
        self.control_points.len()
    }

    /// Number of distinct Voronoi vertices (segment and ray end points).
    pub fn vertex_count(&self) -> usize {
        self.edges
            .iter()
            .flat_map(Edge::point_indices)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Edge list of cell `index`, if cell edges were computed.
    pub fn cell(&self, index: usize) -> Option<&[usize]> {
        self.cell_edges.as_ref()?.get(index).map(Vec::as_slice)
    }

    /// Every edge is a segment and every cell is a closed chain.
    pub fn is_fully_bounded(&self) -> bool {
        let Some(cells) = &self.cell_edges else {
            return false;
        };
        cells.len() == self.control_points.len()
            && cells.iter().all(|c| !c.is_empty())
            && self.edges.iter().all(Edge::is_bounded)
    }

    /// Edge indices of the cell of `site`, unordered.
    pub fn edges_of_site(&self, site: usize) -> Vec<usize> {
        self.edge_sites
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| *a == site || *b == site)
            .map(|(e, _)| e)
            .collect()
    }

    /// Computes and stores the ordered edge list of every cell.
    pub fn compute_cell_edges(&mut self) -> MathResult<()> {
        let cells = (0..self.control_points.len())
            .map(|site| self.walk_cell(site))
            .collect::<MathResult<Vec<_>>>()?;
        self.cell_edges = Some(cells);
        Ok(())
    }

    /// Point loop of cell `index`; rays are cut at `ray_length` from their
    /// start.
    pub fn cell_polygon(&self, index: usize, ray_length: f64) -> MathResult<Vec<Point2D>> {
        if index >= self.control_points.len() {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "cell {} out of range for {} control points",
                    index,
                    self.control_points.len()
                ),
            });
        }
        let walked;
        let chain: &[usize] = match self.cell(index) {
            Some(chain) => chain,
            None => {
                walked = self.walk_cell(index)?;
                walked.as_slice()
            }
        };
        let edges: Vec<Edge> = chain.iter().map(|&e| self.edges[e]).collect();
        polygon_from_edge_chain(&self.edge_points, &edges, ray_length)
    }

    /// Orders the edges around `site` into a chain.
    ///
    /// Closed cells start at the edge closest to the site. Open cells run
    /// from one ray to the other. Cells bounded by lines (collinear input)
    /// keep their edges as found. The chain is reversed if needed so that
    /// it winds counter-clockwise.
    pub(crate) fn walk_cell(&self, site: usize) -> MathResult<Vec<usize>> {
        let members = self.edges_of_site(site);
        if members.is_empty() || members.iter().any(|&e| self.edges[e].is_line()) {
            return Ok(members);
        }

        let rays: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&e| self.edges[e].is_ray())
            .collect();
        let mut chain = match rays.as_slice() {
            [] => self.walk_closed(site, &members)?,
            &[first, last] => self.walk_open(site, &members, first, last)?,
            _ => {
                return Err(MathError::InvariantViolation {
                    context: format!("cell {} has {} unbounded edges", site, rays.len()),
                });
            }
        };

        let ray_length = self.reference_length();
        let edges: Vec<Edge> = chain.iter().map(|&e| self.edges[e]).collect();
        let outline = polygon_from_edge_chain(&self.edge_points, &edges, ray_length)?;
        if simple_geometry::signed_area(&outline) < 0.0 {
            chain.reverse();
        }
        Ok(chain)
    }

    fn walk_closed(&self, site: usize, members: &[usize]) -> MathResult<Vec<usize>> {
        let control = self.control_points[site];
        let Some(&start) = members.iter().min_by(|&&a, &&b| {
            let da = self.edges[a].distance_to(&self.edge_points, control);
            let db = self.edges[b].distance_to(&self.edge_points, control);
            da.total_cmp(&db)
        }) else {
            return Ok(Vec::new());
        };
        let Edge::Segment { p0: first, p1 } = self.edges[start] else {
            return Err(broken_cell(site));
        };

        let mut used = vec![false; self.edges.len()];
        used[start] = true;
        let mut chain = vec![start];
        let mut at = p1;
        while at != first {
            let next = self.next_in_cell(members, &used, at).ok_or_else(|| broken_cell(site))?;
            used[next] = true;
            chain.push(next);
            at = match self.edges[next] {
                Edge::Segment { p0, p1 } if p0 == at => p1,
                Edge::Segment { p0, .. } => p0,
                _ => return Err(broken_cell(site)),
            };
        }
        if chain.len() != members.len() {
            return Err(broken_cell(site));
        }
        Ok(chain)
    }

    fn walk_open(&self, site: usize, members: &[usize], first: usize, last: usize) -> MathResult<Vec<usize>> {
        let mut used = vec![false; self.edges.len()];
        used[first] = true;
        let mut chain = vec![first];
        let mut at = self.edges[first].start();
        loop {
            let next = self.next_in_cell(members, &used, at).ok_or_else(|| broken_cell(site))?;
            used[next] = true;
            chain.push(next);
            match self.edges[next] {
                Edge::Ray { .. } => break,
                Edge::Segment { p0, p1 } => at = if p0 == at { p1 } else { p0 },
                Edge::Line { .. } => return Err(broken_cell(site)),
            }
        }
        if chain.last() != Some(&last) || chain.len() != members.len() {
            return Err(broken_cell(site));
        }
        Ok(chain)
    }

    fn next_in_cell(&self, members: &[usize], used: &[bool], at: usize) -> Option<usize> {
        members
            .iter()
            .copied()
            .find(|&e| !used[e] && self.edges[e].point_indices().contains(&at))
    }

    /// Ray length that reaches well past all finite geometry.
    fn reference_length(&self) -> f64 {
        let all = self
            .control_points
            .iter()
            .chain(self.edge_points.iter())
            .copied();
        Bounds2D::from_points_iter(all).map_or(1.0, |b| b.max_extent().max(1.0))
    }
}

fn broken_cell(site: usize) -> MathError {
    MathError::InvariantViolation {
        context: format!("edges of cell {} do not form a chain", site),
    }
}
