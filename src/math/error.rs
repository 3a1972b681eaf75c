// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error("Duplicate input points at indices {first} and {second}")]
    DuplicatePoint { first: usize, second: usize },

    #[error("Point capacity exceeded: limit is {limit}, got {actual}")]
    CapacityExceeded { limit: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Points are not coplanar: max deviation {deviation} exceeds tolerance {tolerance}")]
    NotCoplanar { deviation: f64, tolerance: f64 },

    #[error("Edge chain is broken: edges {index} and {next} share no endpoint")]
    BrokenEdgeChain { index: usize, next: usize },

    #[error("Internal invariant violated: {context}")]
    InvariantViolation { context: String },

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },
}

pub type MathResult<T> = Result<T, MathError>;
