// src/math/geometry/voronoi/beachline.rs

//! Beachline of the sweep, stored as an AVL tree in a node arena.
//!
//! Leaves are parabolic arcs (one input site each), internal nodes are the
//! breakpoints between the rightmost arc of their left subtree and the
//! leftmost arc of their right subtree. Nodes refer to each other by arena
//! index only, so rotations and replacements are plain index rewrites.
//! Removed nodes stay in the arena; nothing reachable from the root points
//! at them any more.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
};

pub(crate) type NodeId = usize;

/// Fixed precision for breakpoint positions. Rounding keeps the ordering of
/// nearly coincident breakpoints stable between consecutive descents.
pub(crate) const COORDINATE_PRECISION: f64 = 1e-9;

#[inline]
pub(crate) fn round_coordinate(value: f64) -> f64 {
    (value / COORDINATE_PRECISION).round() * COORDINATE_PRECISION
}

/// Which end of a Voronoi edge a breakpoint traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeEnd {
    A,
    B,
}

impl EdgeEnd {
    pub(crate) fn index(self) -> usize {
        match self {
            EdgeEnd::A => 0,
            EdgeEnd::B => 1,
        }
    }
}

/// Boundary between the arcs of `left_site` and `right_site`. It traces
/// end `end` of edge `edge` while the sweep advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Breakpoint {
    pub left_site: usize,
    pub right_site: usize,
    pub edge: usize,
    pub end: EdgeEnd,
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Arc {
        site: usize,
        circle_event: Option<usize>,
    },
    Breakpoint(Breakpoint),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: usize,
}

impl Node {
    fn arc(site: usize) -> Self {
        Self {
            kind: NodeKind::Arc {
                site,
                circle_event: None,
            },
            parent: None,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn breakpoint(data: Breakpoint) -> Self {
        Self {
            kind: NodeKind::Breakpoint(data),
            parent: None,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// The breakpoints and arcs around one arc of the beachline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArcNeighbors {
    pub predecessor: NodeId,
    pub successor: NodeId,
    pub left_arc: NodeId,
    pub right_arc: NodeId,
}

/// X position of the breakpoint between the arc of `left` (to its left) and
/// the arc of `right` for a sweepline at `sweep_y`.
///
/// Sites on the sweepline have degenerate, vertical arcs; their breakpoint
/// is the site's own x, or the midpoint if both sites are on the line.
pub(crate) fn breakpoint_x(left: Point2D, right: Point2D, sweep_y: f64) -> f64 {
    let left_on_line = left.y >= sweep_y;
    let right_on_line = right.y >= sweep_y;
    match (left_on_line, right_on_line) {
        (true, true) => return round_coordinate(0.5 * (left.x + right.x)),
        (true, false) => return left.x,
        (false, true) => return right.x,
        (false, false) => {}
    }

    // Intersection of both parabolas: a*x^2 + b*x + c = 0
    let dl = 2.0 * (left.y - sweep_y);
    let dr = 2.0 * (right.y - sweep_y);
    let a = 1.0 / dl - 1.0 / dr;
    let b = -2.0 * left.x / dl + 2.0 * right.x / dr;
    let c = (left.x * left.x + left.y * left.y - sweep_y * sweep_y) / dl
        - (right.x * right.x + right.y * right.y - sweep_y * sweep_y) / dr;
    let root = (b * b - 4.0 * a * c).max(0.0).sqrt();

    // The wanted root is (-b - root) / 2a, the one where the left arc stops
    // being the upper one. Pick the cancellation free form of it.
    let x = if b < 0.0 {
        2.0 * c / (root - b)
    } else if a != 0.0 {
        (-b - root) / (2.0 * a)
    } else {
        0.5 * (left.x + right.x)
    };
    round_coordinate(x)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Beachline {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Beachline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Starts the beachline with a single arc.
    pub fn insert_first(&mut self, site: usize) -> NodeId {
        let id = self.push(Node::arc(site));
        self.root = Some(id);
        id
    }

    /// Site of an arc node.
    pub fn site(&self, arc: NodeId) -> Option<usize> {
        match self.nodes[arc].kind {
            NodeKind::Arc { site, .. } => Some(site),
            NodeKind::Breakpoint(_) => None,
        }
    }

    pub fn breakpoint(&self, node: NodeId) -> Option<Breakpoint> {
        match self.nodes[node].kind {
            NodeKind::Breakpoint(data) => Some(data),
            NodeKind::Arc { .. } => None,
        }
    }

    pub fn circle_event(&self, arc: NodeId) -> Option<usize> {
        match self.nodes[arc].kind {
            NodeKind::Arc { circle_event, .. } => circle_event,
            NodeKind::Breakpoint(_) => None,
        }
    }

    pub fn set_circle_event(&mut self, arc: NodeId, event: Option<usize>) {
        if let NodeKind::Arc { circle_event, .. } = &mut self.nodes[arc].kind {
            *circle_event = event;
        }
    }

    /// Arc vertically above `x` for a sweepline at `sweep_y`.
    pub fn arc_above(&self, sites: &[Point2D], x: f64, sweep_y: f64) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            match node.kind {
                NodeKind::Arc { .. } => return Some(current),
                NodeKind::Breakpoint(bp) => {
                    let bx = breakpoint_x(sites[bp.left_site], sites[bp.right_site], sweep_y);
                    current = if x < bx { node.left? } else { node.right? };
                }
            }
        }
    }

    pub fn rightmost_arc(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost_leaf(root))
    }

    /// Replaces `arc` by `(old | new)` with the two arcs as children. Used
    /// while all sites so far lie on the first row.
    pub fn split_first_row(&mut self, arc: NodeId, new_site: usize, edge: usize) -> MathResult<(NodeId, NodeId)> {
        let old_site = self.site(arc).ok_or_else(|| not_an_arc(arc))?;
        let parent = self.nodes[arc].parent;
        let left = self.push(Node::arc(old_site));
        let right = self.push(Node::arc(new_site));
        let bp = self.push(Node::breakpoint(Breakpoint {
            left_site: old_site,
            right_site: new_site,
            edge,
            end: EdgeEnd::B,
        }));
        self.attach(bp, left, right);
        self.replace_child(parent, arc, bp);
        self.rebalance(parent);
        Ok((left, right))
    }

    /// Splits `arc` at a new site: `old | new | old`. The left breakpoint
    /// traces end B of `edge`, the right one end A.
    ///
    /// Returns the left old arc, the new arc and the right old arc.
    pub fn split_arc(&mut self, arc: NodeId, new_site: usize, edge: usize) -> MathResult<[NodeId; 3]> {
        let old_site = self.site(arc).ok_or_else(|| not_an_arc(arc))?;
        let parent = self.nodes[arc].parent;

        let left = self.push(Node::arc(old_site));
        let middle = self.push(Node::arc(new_site));
        let right = self.push(Node::arc(old_site));
        let inner = self.push(Node::breakpoint(Breakpoint {
            left_site: new_site,
            right_site: old_site,
            edge,
            end: EdgeEnd::A,
        }));
        let outer = self.push(Node::breakpoint(Breakpoint {
            left_site: old_site,
            right_site: new_site,
            edge,
            end: EdgeEnd::B,
        }));
        self.attach(inner, middle, right);
        self.attach(outer, left, inner);
        self.replace_child(parent, arc, outer);
        self.rebalance(parent);
        Ok([left, middle, right])
    }

    /// Breakpoints and arcs directly left and right of `arc`, if it has
    /// neighbours on both sides.
    pub fn neighbors(&self, arc: NodeId) -> Option<ArcNeighbors> {
        let predecessor = self.predecessor(arc)?;
        let successor = self.successor(arc)?;
        Some(ArcNeighbors {
            predecessor,
            successor,
            left_arc: self.rightmost_leaf(self.nodes[predecessor].left?),
            right_arc: self.leftmost_leaf(self.nodes[successor].right?),
        })
    }

    pub fn prev_arc(&self, arc: NodeId) -> Option<NodeId> {
        let pred = self.predecessor(arc)?;
        Some(self.rightmost_leaf(self.nodes[pred].left?))
    }

    pub fn next_arc(&self, arc: NodeId) -> Option<NodeId> {
        let succ = self.successor(arc)?;
        Some(self.leftmost_leaf(self.nodes[succ].right?))
    }

    /// Removes a vanishing arc. Its parent breakpoint disappears with it and
    /// the other adjacent breakpoint takes over `merged`.
    pub fn remove_arc(&mut self, arc: NodeId, merged: Breakpoint) -> MathResult<()> {
        let around = self.neighbors(arc).ok_or_else(|| MathError::InvariantViolation {
            context: format!("arc {} has no neighbour on one side", arc),
        })?;
        let parent = self.nodes[arc].parent.ok_or_else(|| MathError::InvariantViolation {
            context: format!("arc {} has no parent", arc),
        })?;
        let sibling = if self.nodes[parent].left == Some(arc) {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        }
        .ok_or_else(|| MathError::InvariantViolation {
            context: format!("breakpoint {} has a single child", parent),
        })?;

        let survivor = if parent == around.predecessor {
            around.successor
        } else {
            around.predecessor
        };
        let grandparent = self.nodes[parent].parent;
        self.replace_child(grandparent, parent, sibling);
        self.nodes[survivor].kind = NodeKind::Breakpoint(merged);
        self.rebalance(grandparent);
        Ok(())
    }

    /// All breakpoints still on the beachline, left to right.
    #[cfg(test)]
    fn breakpoints(&self) -> Vec<Breakpoint> {
        let mut result = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id].left;
            }
            if let Some(id) = stack.pop() {
                if let NodeKind::Breakpoint(bp) = self.nodes[id].kind {
                    result.push(bp);
                }
                current = self.nodes[id].right;
            }
        }
        result
    }

    /// Sites of all arcs, left to right.
    #[cfg(test)]
    fn arc_sites(&self) -> Vec<usize> {
        let mut sites = Vec::new();
        let mut arc = self.root.map(|r| self.leftmost_leaf(r));
        while let Some(id) = arc {
            sites.extend(self.site(id));
            arc = self.next_arc(id);
        }
        sites
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: NodeId, left: NodeId, right: NodeId) {
        self.nodes[parent].left = Some(left);
        self.nodes[parent].right = Some(right);
        self.nodes[left].parent = Some(parent);
        self.nodes[right].parent = Some(parent);
        self.update_height(parent);
    }

    /// Closest ancestor that has `node` in its right subtree.
    fn predecessor(&self, mut node: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.nodes[node].parent?;
            if self.nodes[parent].right == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
    }

    /// Closest ancestor that has `node` in its left subtree.
    fn successor(&self, mut node: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.nodes[node].parent?;
            if self.nodes[parent].left == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
    }

    fn leftmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let Some(left) = self.nodes[node].left {
            node = left;
        }
        node
    }

    fn rightmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let Some(right) = self.nodes[node].right {
            node = right;
        }
        node
    }

    fn height(&self, node: Option<NodeId>) -> usize {
        node.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, node: NodeId) {
        let height = 1 + self
            .height(self.nodes[node].left)
            .max(self.height(self.nodes[node].right));
        self.nodes[node].height = height;
    }

    fn balance(&self, node: NodeId) -> isize {
        self.height(self.nodes[node].left) as isize - self.height(self.nodes[node].right) as isize
    }

    /// Points `parent`'s link to `old` (or the root) at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if self.nodes[p].left == Some(old) {
                    self.nodes[p].left = Some(new);
                } else {
                    self.nodes[p].right = Some(new);
                }
            }
        }
        self.nodes[new].parent = parent;
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let parent = self.nodes[x].parent;
        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        self.replace_child(parent, x, y);
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].left else {
            return x;
        };
        let parent = self.nodes[x].parent;
        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        self.replace_child(parent, x, y);
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Restores heights and balance from `start` up to the root.
    fn rebalance(&mut self, start: Option<NodeId>) {
        let mut current = start;
        while let Some(mut node) = current {
            self.update_height(node);
            let balance = self.balance(node);
            if balance > 1 {
                if let Some(left) = self.nodes[node].left {
                    if self.balance(left) < 0 {
                        self.rotate_left(left);
                    }
                }
                node = self.rotate_right(node);
            } else if balance < -1 {
                if let Some(right) = self.nodes[node].right {
                    if self.balance(right) > 0 {
                        self.rotate_right(right);
                    }
                }
                node = self.rotate_left(node);
            }
            current = self.nodes[node].parent;
        }
    }
}

fn not_an_arc(node: NodeId) -> MathError {
    MathError::InvariantViolation {
        context: format!("beachline node {} is not an arc", node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn breakpoint_between_sites_at_equal_height_is_the_midpoint() {
        let l = Point2D::new(0.0, 0.0);
        let r = Point2D::new(4.0, 0.0);
        assert_relative_eq!(breakpoint_x(l, r, 3.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(breakpoint_x(l, r, 0.0), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn breakpoint_is_equidistant() {
        let l = Point2D::new(0.0, 0.0);
        let r = Point2D::new(3.0, 1.0);
        let sweep = 4.0;
        for (a, b) in [(l, r), (r, l)] {
            let x = breakpoint_x(a, b, sweep);
            // Height on the parabola of `a`
            let y = ((x - a.x).powi(2) + a.y * a.y - sweep * sweep) / (2.0 * (a.y - sweep));
            let p = Point2D::new(x, y);
            assert_relative_eq!(p.distance(a), sweep - y, epsilon = 1e-6);
            assert_relative_eq!(p.distance(b), sweep - y, epsilon = 1e-6);
        }
        // The two breakpoints of a pair are distinct.
        assert!(breakpoint_x(l, r, sweep) != breakpoint_x(r, l, sweep));
    }

    #[test]
    fn site_on_the_sweepline_pins_the_breakpoint() {
        let low = Point2D::new(0.0, 0.0);
        let new = Point2D::new(1.5, 2.0);
        assert_eq!(breakpoint_x(low, new, 2.0), 1.5);
        assert_eq!(breakpoint_x(new, low, 2.0), 1.5);
    }

    #[test]
    fn splits_keep_arc_order_and_balance() {
        let mut beachline = Beachline::new();
        let first = beachline.insert_first(0);
        let [_, middle, right] = beachline.split_arc(first, 1, 0).unwrap();
        assert_eq!(beachline.arc_sites(), vec![0, 1, 0]);
        let [_, _, _] = beachline.split_arc(right, 2, 1).unwrap();
        assert_eq!(beachline.arc_sites(), vec![0, 1, 0, 2, 0]);
        let [_, _, _] = beachline.split_arc(middle, 3, 2).unwrap();
        assert_eq!(beachline.arc_sites(), vec![0, 1, 3, 1, 0, 2, 0]);
        assert_eq!(beachline.breakpoints().len(), 6);
        let root = beachline.root.unwrap();
        assert!(beachline.balance(root).abs() <= 1);
    }

    #[test]
    fn removing_an_arc_merges_its_breakpoints() {
        let mut beachline = Beachline::new();
        let first = beachline.insert_first(0);
        let [_, _, right] = beachline.split_arc(first, 1, 0).unwrap();
        let [_, middle, _] = beachline.split_arc(right, 2, 1).unwrap();
        // Arcs: 0 1 0 2 0; remove the 0 between 1 and 2.
        let around = beachline.neighbors(middle).unwrap();
        let vanishing = beachline.prev_arc(around.left_arc).unwrap();
        assert_eq!(beachline.site(vanishing), Some(1));
        let merged = Breakpoint {
            left_site: 1,
            right_site: 2,
            edge: 2,
            end: EdgeEnd::B,
        };
        beachline.remove_arc(around.left_arc, merged).unwrap();
        assert_eq!(beachline.arc_sites(), vec![0, 1, 2, 0]);
        assert!(beachline.breakpoints().contains(&merged));
        assert_eq!(beachline.breakpoints().len(), 3);
    }

    #[test]
    fn first_row_split_appends_to_the_right() {
        let mut beachline = Beachline::new();
        beachline.insert_first(0);
        for site in 1..5 {
            let arc = beachline.rightmost_arc().unwrap();
            beachline.split_first_row(arc, site, site - 1).unwrap();
        }
        assert_eq!(beachline.arc_sites(), vec![0, 1, 2, 3, 4]);
        let sites: Vec<Point2D> = (0..5).map(|i| Point2D::new(i as f64, 0.0)).collect();
        let above = beachline.arc_above(&sites, 2.2, 1.0).unwrap();
        assert_eq!(beachline.site(above), Some(2));
    }
}
