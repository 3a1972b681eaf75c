// src/math/geometry/voronoi/config.rs

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
};
use serde::{Deserialize, Serialize};

/// Settings of the Voronoi sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoronoiConfig {
    /// Ordered edge lists per control point are computed when set.
    pub compute_cell_edges: bool,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            compute_cell_edges: true,
        }
    }
}

impl VoronoiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_edges(mut self, compute: bool) -> Self {
        self.compute_cell_edges = compute;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        Ok(())
    }
}

/// How the cap radius is derived when no fixed radius is set.
///
/// Both variants add `margin_factor` times the smallest distance between an
/// unbounded cell's site and its open edges. They never shrink the circle
/// below the radius whose polygon still contains every control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadiusHeuristic {
    /// Polygon encloses all control points and finite vertices, so bounded
    /// cells stay whole.
    #[default]
    Enclosing,
    /// Mean distance of the control points from the center; bounded cells
    /// far out may be cut.
    Average,
}

/// Settings for capping Voronoi cells to a circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CappingConfig {
    /// Fixed circle radius. Derived from the diagram when `None`.
    pub radius: Option<f64>,
    /// Fixed circle center. Center of the control point bounds when `None`.
    pub center: Option<Point2D>,
    /// How a missing `radius` is derived.
    pub radius_heuristic: RadiusHeuristic,
    /// Number of vertices of the circle polygon.
    pub circle_sides: usize,
    /// Weight of the smallest site-to-edge distance of the unbounded
    /// cells in the derived radius.
    pub margin_factor: f64,
    /// Radius used for a single control point without a fixed radius.
    pub default_radius: f64,
}

impl Default for CappingConfig {
    /// Default values:
    /// - `radius`: derived
    /// - `center`: derived
    /// - `radius_heuristic`: `RadiusHeuristic::Enclosing`
    /// - `circle_sides`: 64
    /// - `margin_factor`: 0.75
    /// - `default_radius`: 1.0
    fn default() -> Self {
        Self {
            radius: None,
            center: None,
            radius_heuristic: RadiusHeuristic::default(),
            circle_sides: 64,
            margin_factor: 0.75,
            default_radius: 1.0,
        }
    }
}

impl CappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_center(mut self, center: Point2D) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_radius_heuristic(mut self, heuristic: RadiusHeuristic) -> Self {
        self.radius_heuristic = heuristic;
        self
    }

    pub fn with_circle_sides(mut self, sides: usize) -> Self {
        self.circle_sides = sides;
        self
    }

    pub fn with_margin_factor(mut self, factor: f64) -> Self {
        self.margin_factor = factor;
        self
    }

    pub fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if let Some(radius) = self.radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(MathError::InvalidConfiguration {
                    message: format!("Cap radius must be positive, got {}", radius),
                });
            }
        }
        if self.center.is_some_and(|c| !c.is_finite()) {
            return Err(MathError::InvalidConfiguration {
                message: "Cap center must be finite".to_string(),
            });
        }
        if self.circle_sides < 3 {
            return Err(MathError::InvalidConfiguration {
                message: format!("Cap circle needs at least 3 sides, got {}", self.circle_sides),
            });
        }
        if !(self.margin_factor.is_finite() && self.margin_factor >= 0.0) {
            return Err(MathError::InvalidConfiguration {
                message: format!("Margin factor must be non-negative, got {}", self.margin_factor),
            });
        }
        if !(self.default_radius.is_finite() && self.default_radius > 0.0) {
            return Err(MathError::InvalidConfiguration {
                message: format!("Default radius must be positive, got {}", self.default_radius),
            });
        }
        Ok(())
    }
}
