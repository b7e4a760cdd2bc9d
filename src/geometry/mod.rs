pub mod curve;
pub mod directed;
pub mod offset;

pub use curve::{
    Arc, Clothoid, CubicBezier, CubicBezier3, Curve, Straight, Turn,
};
pub use directed::{DirectedPoint2, DirectedPoint3};
pub use offset::PiecewiseLinearOffset;
