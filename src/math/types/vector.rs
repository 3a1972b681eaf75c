// src/math/types/vector.rs

use crate::math::types::Point2D;
use nalgebra::{Vector2, Vector3};

/// 3D points are plain nalgebra vectors; only the planar hull path needs them.
pub type Point3D = Vector3<f64>;

// --- Konvertierungsfunktionen ---

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Point2D::new(v.x, v.y)
    }
}

impl From<Point2D> for Vector2<f64> {
    fn from(p: Point2D) -> Self {
        Vector2::new(p.x, p.y)
    }
}

/// Drops the Z component.
pub fn to_plane(v: &Point3D) -> Point2D {
    Point2D::new(v.x, v.y)
}

/// Lifts a plane point to 3D at height `z`.
pub fn from_plane(p: Point2D, z: f64) -> Point3D {
    Point3D::new(p.x, p.y, z)
}
