// src/math/types/point.rs

use crate::math::utils::constants;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A point (or free vector) in the plane.
///
/// Equality is tolerance based: two points compare equal when both coordinate
/// differences are at most [`constants::EPSILON`]. This relation is not
/// transitive, so `Point2D` deliberately implements neither `Eq` nor `Hash`.
/// Containers that need to dedupe points go through
/// [`PointPool`](crate::math::geometry::edge::PointPool) instead.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar 2D cross product (`self.x * other.y - self.y * other.x`).
    /// Positive when `other` is counter-clockwise from `self`.
    #[inline]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance_squared(self, other: Self) -> f64 {
        (other - self).length_squared()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the same direction, `None` for (near) zero vectors.
    pub fn try_normalize(self) -> Option<Self> {
        let len = self.length();
        if len <= constants::EPSILON_SQUARED {
            None
        } else {
            Some(self / len)
        }
    }

    /// Unit vector, or `ZERO` if the vector has no usable length.
    pub fn normalize_or_zero(self) -> Self {
        self.try_normalize().unwrap_or(Self::ZERO)
    }

    /// Counter-clockwise perpendicular `(-y, x)`.
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    /// Tolerance comparison with a caller supplied epsilon.
    pub fn nearly_equals(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.nearly_equals(*other, constants::EPSILON)
    }
}

impl Add for Point2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point2D {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point2D {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point2D {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

// Conversion traits
impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

impl From<geo::Coord<f64>> for Point2D {
    fn from(c: geo::Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<Point2D> for geo::Coord<f64> {
    fn from(p: Point2D) -> Self {
        geo::Coord { x: p.x, y: p.y }
    }
}

/// Builds a point list from coordinate pairs, handy for literals.
pub fn points_from_tuples(coords: &[(f64, f64)]) -> Vec<Point2D> {
    coords.iter().copied().map(Point2D::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn equality_is_tolerance_based() {
        let a = Point2D::new(1.0, 2.0);
        let b = Point2D::new(1.0 + constants::EPSILON * 0.5, 2.0);
        let c = Point2D::new(1.0 + constants::EPSILON * 4.0, 2.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn vector_algebra() {
        let a = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.length(), 5.0);
        assert_relative_eq!(a.dot(Point2D::new(1.0, 0.0)), 3.0);
        assert_relative_eq!(Point2D::X.cross(Point2D::Y), 1.0);
        assert_eq!(Point2D::X.perp(), Point2D::Y);
        let n = a.try_normalize().unwrap();
        assert_relative_eq!(n.length(), 1.0);
        assert!(Point2D::ZERO.try_normalize().is_none());
        assert_eq!(a.midpoint(Point2D::ZERO), Point2D::new(1.5, 2.0));
    }
}
