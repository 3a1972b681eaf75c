// src/math/geometry/circle_cache.rs

//! Memoized unit-circle tessellations.
//!
//! Capping Voronoi cells needs the same circle polygon over and over. The
//! cache builds each side count once and hands out shared slices afterwards.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
    utils::constants,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Thread-safe cache of unit-circle polygons keyed by side count.
///
/// Polygons are counter-clockwise and start at angle zero. Lookups only
/// take the lock for the map access; the vertex data itself is shared via
/// `Arc` and never mutated after insertion.
#[derive(Debug, Default)]
pub struct UnitCircleCache {
    entries: Mutex<HashMap<usize, Arc<[Point2D]>>>,
}

impl UnitCircleCache {
    pub const MIN_SIDES: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Unit circle polygon with `sides` vertices, computed on first request.
    pub fn unit_circle(&self, sides: usize) -> MathResult<Arc<[Point2D]>> {
        if sides < Self::MIN_SIDES {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "Circle tessellation needs at least {} sides, got {}",
                    Self::MIN_SIDES,
                    sides
                ),
            });
        }

        // A poisoned mutex still only holds fully inserted entries.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let circle = entries.entry(sides).or_insert_with(|| {
            trace!(sides, "tessellating unit circle");
            (0..sides)
                .map(|i| {
                    let angle = constants::TAU * i as f64 / sides as f64;
                    Point2D::new(angle.cos(), angle.sin())
                })
                .collect()
        });
        Ok(Arc::clone(circle))
    }

    /// Circle polygon scaled to `radius` and moved to `center`.
    pub fn circle(&self, center: Point2D, radius: f64, sides: usize) -> MathResult<Vec<Point2D>> {
        let unit = self.unit_circle(sides)?;
        Ok(unit.iter().map(|p| center + *p * radius).collect())
    }

    /// Number of distinct side counts cached so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::utils::simple_geometry::signed_area;
    use approx::assert_relative_eq;
    use std::thread;

    #[test]
    fn builds_once_per_side_count() {
        let cache = UnitCircleCache::new();
        let a = cache.unit_circle(8).unwrap();
        let b = cache.unit_circle(8).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        cache.unit_circle(16).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn circle_points_lie_on_the_circle() {
        let cache = UnitCircleCache::new();
        let c = cache.circle(Point2D::new(5.0, -2.0), 3.0, 32).unwrap();
        assert_eq!(c.len(), 32);
        for p in &c {
            assert_relative_eq!(p.distance(Point2D::new(5.0, -2.0)), 3.0, epsilon = 1e-12);
        }
        assert!(signed_area(&c) > 0.0);
    }

    #[test]
    fn rejects_too_few_sides() {
        assert!(UnitCircleCache::new().unit_circle(2).is_err());
    }

    #[test]
    fn concurrent_lookups_share_entries() {
        let cache = Arc::new(UnitCircleCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.unit_circle(12).unwrap().len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 12);
        }
        assert_eq!(cache.len(), 1);
    }
}
