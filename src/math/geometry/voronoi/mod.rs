// src/math/geometry/voronoi/mod.rs

//! Voronoi-Diagramme: Fortune-Sweepline und Abschneiden an einem Kreis.

pub(crate) mod beachline;
pub(crate) mod events;

pub mod builder;
pub mod capping;
pub mod config;
pub mod diagram;

pub use self::builder::VoronoiBuilder;
pub use self::capping::VoronoiCapper;
pub use self::config::{CappingConfig, RadiusHeuristic, VoronoiConfig};
pub use self::diagram::VoronoiResult;
