pub mod algorithms;
pub mod error;
pub mod geometry;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        algorithms::{
            ConvexHull, ConvexHullComputer, DelaunayConfig, DelaunayTriangulator, PolygonBooleanOps,
            PolygonClipper, Triangulation, UnionConfig,
        },
        error::{MathError, MathResult},
        geometry::{
            CappingConfig, Edge, PolygonWithHoles, RadiusHeuristic, VoronoiBuilder, VoronoiCapper,
            VoronoiConfig, VoronoiResult,
        },
        types::*,
        utils::winding::PolygonOrientation,
    };
}
