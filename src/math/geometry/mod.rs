// src/math/geometry/mod.rs

// Deklaration der Haupt-Geometriemodule
pub mod circle_cache;
pub mod edge;
pub mod polygon;
pub mod voronoi;

// Re-Exporte für einen schnellen Zugriff auf die Kern-Geometrietypen,
// falls man nicht das gesamte `math::prelude` importieren möchte.
pub use self::circle_cache::UnitCircleCache;
pub use self::edge::{Edge, PointPool, polygon_from_edge_chain};
pub use self::polygon::PolygonWithHoles;
pub use self::voronoi::{
    CappingConfig, RadiusHeuristic, VoronoiBuilder, VoronoiCapper, VoronoiConfig, VoronoiResult,
};
