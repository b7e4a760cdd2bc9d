use thiserror::Error;

/// Top-level error type for the roadgeom curve engine.
#[derive(Debug, Error)]
pub enum RoadGeomError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to curve construction and evaluation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("{solver} did not converge within {iterations} iterations")]
    NoConvergence {
        solver: &'static str,
        iterations: usize,
    },
}

/// Errors related to piecewise-linear offset functions.
#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("offset fraction {0} is outside [0, 1]")]
    FractionOutOfRange(f64),

    #[error("duplicate offset fraction {0}")]
    DuplicateFraction(f64),

    #[error("offset value {value} at fraction {fraction} is not finite")]
    NonFiniteValue { fraction: f64, value: f64 },

    #[error("an offset function needs at least one entry")]
    Empty,
}

/// Errors related to flattening curves into polylines.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid flattening parameters: {0}")]
    InvalidParameters(String),

    #[error(
        "flattening stalled near fraction {fraction} after {insertions} consecutive \
         insertions; the curve likely contains an undeclared kink"
    )]
    KinkValve { fraction: f64, insertions: usize },

    #[error("a polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
}

/// Convenience type alias for results using [`RoadGeomError`].
pub type Result<T> = std::result::Result<T, RoadGeomError>;
