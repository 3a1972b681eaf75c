// src/math/types/bounds.rs

use crate::math::{error::*, types::Point2D};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    pub min: Point2D,
    pub max: Point2D,
}

impl Bounds2D {
    /// Box from explicit corners; `min` must not exceed `max`.
    pub fn new(min: Point2D, max: Point2D) -> MathResult<Self> {
        if min.x > max.x || min.y > max.y {
            return Err(MathError::InvalidConfiguration {
                message: format!("Invalid bounds: min {:?} > max {:?}", min, max),
            });
        }

        Ok(Self { min, max })
    }

    /// Box spanned by two arbitrary corner points.
    pub fn from_points(p1: Point2D, p2: Point2D) -> Self {
        Self {
            min: Point2D::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            max: Point2D::new(p1.x.max(p2.x), p1.y.max(p2.y)),
        }
    }

    /// Smallest box around all points, `None` for an empty iterator.
    pub fn from_points_iter<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2D>,
    {
        let mut points_iter = points.into_iter();
        let first_point = points_iter.next()?;

        let mut bounds = Self {
            min: first_point,
            max: first_point,
        };
        for point in points_iter {
            bounds.expand_to_include_point(point);
        }

        Some(bounds)
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.is_finite()
            && self.max.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Point2D {
        self.max - self.min
    }

    /// Larger of width and height.
    pub fn max_extent(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn center(&self) -> Point2D {
        self.min.midpoint(self.max)
    }

    pub fn contains_point(&self, point: Point2D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bounds2D) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn expand_to_include_point(&mut self, point: Point2D) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        let offset = Point2D::new(margin, margin);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }

    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.min,
            Point2D::new(self.max.x, self.min.y),
            self.max,
            Point2D::new(self.min.x, self.max.y),
        ]
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Bounds2D(min: ({:.3}, {:.3}), max: ({:.3}, {:.3}))",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_from_points() {
        let pts = [
            Point2D::new(1.0, 5.0),
            Point2D::new(-2.0, 3.0),
            Point2D::new(4.0, -1.0),
        ];
        let b = Bounds2D::from_points_iter(pts).unwrap();
        assert_eq!(b.min, Point2D::new(-2.0, -1.0));
        assert_eq!(b.max, Point2D::new(4.0, 5.0));
        assert_eq!(b.center(), Point2D::new(1.0, 2.0));
        assert!(b.contains_point(Point2D::new(0.0, 0.0)));
        assert!(Bounds2D::from_points_iter(std::iter::empty()).is_none());
        assert!(Bounds2D::new(Point2D::new(1.0, 1.0), Point2D::ZERO).is_err());
    }
}
