//! Computational-geometry engine for continuous parametric curves.
//!
//! `roadgeom` describes lane/road centerlines and similar smooth paths as
//! parametric curves (straight segments, circular arcs, cubic Béziers,
//! clothoids) over a fraction domain of `[0, 1]`, optionally displaced
//! laterally by a piecewise-linear offset function, and converts them into
//! discrete polylines within a controlled approximation error.

pub mod error;
pub mod geometry;
pub mod math;
pub mod tessellation;

pub use error::{Result, RoadGeomError};
