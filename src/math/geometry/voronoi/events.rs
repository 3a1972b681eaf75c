// src/math/geometry/voronoi/events.rs

use super::beachline::NodeId;
use crate::math::types::Point2D;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EventKind {
    /// The sweepline reaches an input site.
    Site { site: usize },
    /// The arc `arc` shrinks to a point at `center`.
    Circle { arc: NodeId, center: Point2D },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Event {
    pub y: f64,
    pub x: f64,
    pub id: usize,
    pub kind: EventKind,
}

impl Event {
    /// Circle events run before site events at the same position.
    fn rank(&self) -> u8 {
        match self.kind {
            EventKind::Circle { .. } => 0,
            EventKind::Site { .. } => 1,
        }
    }
}

// BinaryHeap is a max-heap: reversed order pops the lowest event first
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .y
            .total_cmp(&self.y)
            .then_with(|| other.x.total_cmp(&self.x))
            .then_with(|| other.rank().cmp(&self.rank()))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Priority queue of sweep events, ascending by `(y, x)`.
///
/// Circle events are never removed once queued; invalidating one only
/// marks its id, and `pop` skips marked events.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Event>,
    valid: Vec<bool>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_site(&mut self, site: usize, position: Point2D) -> usize {
        self.push(position.y, position.x, EventKind::Site { site })
    }

    /// Queues the collapse of `arc`; the event fires at the top of the
    /// circle, `center.y + radius`.
    pub fn push_circle(&mut self, arc: NodeId, center: Point2D, radius: f64) -> usize {
        self.push(center.y + radius, center.x, EventKind::Circle { arc, center })
    }

    pub fn invalidate(&mut self, id: usize) {
        if let Some(flag) = self.valid.get_mut(id) {
            *flag = false;
        }
    }

    pub fn is_valid(&self, id: usize) -> bool {
        self.valid.get(id).copied().unwrap_or(false)
    }

    /// Next valid event.
    pub fn pop(&mut self) -> Option<Event> {
        while let Some(event) = self.heap.pop() {
            if self.is_valid(event.id) {
                return Some(event);
            }
        }
        None
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn push(&mut self, y: f64, x: f64, kind: EventKind) -> usize {
        let id = self.valid.len();
        self.valid.push(true);
        self.heap.push(Event { y, x, id, kind });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_sweep_order() {
        let mut queue = EventQueue::new();
        queue.push_site(0, Point2D::new(5.0, 2.0));
        queue.push_site(1, Point2D::new(1.0, 2.0));
        queue.push_site(2, Point2D::new(9.0, -1.0));
        let order: Vec<usize> = std::iter::from_fn(|| queue.pop())
            .map(|e| match e.kind {
                EventKind::Site { site } => site,
                EventKind::Circle { .. } => usize::MAX,
            })
            .collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn circle_before_site_at_same_position() {
        let mut queue = EventQueue::new();
        queue.push_site(0, Point2D::new(1.0, 3.0));
        queue.push_circle(7, Point2D::new(1.0, 1.0), 2.0);
        let first = queue.pop().unwrap();
        assert!(matches!(first.kind, EventKind::Circle { arc: 7, .. }));
    }

    #[test]
    fn invalidated_events_are_skipped() {
        let mut queue = EventQueue::new();
        let stale = queue.push_circle(3, Point2D::new(0.0, 0.0), 1.0);
        queue.push_site(0, Point2D::new(0.0, 5.0));
        queue.invalidate(stale);
        assert!(!queue.is_valid(stale));
        assert!(matches!(queue.pop().unwrap().kind, EventKind::Site { site: 0 }));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
