// src/math/algorithms/mod.rs

// Deklaration der verschiedenen Algorithmus-Kategorien
pub mod boolean;
pub mod clipping;
pub mod convex_hull;
pub mod triangulation;

// Konvexe Hülle
pub use self::convex_hull::{ConvexHull, ConvexHullComputer, PlaneFit, ProjectedHull};

// Triangulation
pub use self::triangulation::{
    Circumcircle, DelaunayConfig, DelaunayTriangulator, Triangle, Triangulation, circumcircle,
};

// Clipping
pub use self::clipping::PolygonClipper;

// Boolean-Operationen
pub use self::boolean::{PolygonBooleanOps, UnionConfig, find_polygon_islands};
