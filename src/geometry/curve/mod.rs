mod arc;
mod bezier_offset;
mod clothoid;
mod cubic_bezier;
mod cubic_bezier_3d;
mod straight;

pub use arc::{Arc, Turn};
pub use clothoid::Clothoid;
pub use cubic_bezier::CubicBezier;
pub use cubic_bezier_3d::CubicBezier3;
pub use straight::Straight;

use crate::error::Result;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::{perpendicular, unit_vector, Point2, TOLERANCE};
use crate::tessellation::{Flattener, Polyline};

/// A parametric 2D curve over the fraction domain `[0, 1]`.
///
/// `point(0.0)` is the start and `point(1.0)` the end of the curve.
/// Implementations are immutable once constructed; callers must not pass
/// fractions outside `[0, 1]`.
pub trait Curve {
    /// Total arc length.
    fn length(&self) -> f64;

    /// Position at `fraction`.
    fn point(&self, fraction: f64) -> Point2;

    /// Tangent heading in radians at `fraction`.
    fn direction(&self, fraction: f64) -> f64;

    /// Signed curvature at the start. A left turn is positive.
    fn start_curvature(&self) -> f64;

    /// Signed curvature at the end.
    fn end_curvature(&self) -> f64;

    /// Fractions in `(0, 1)` at which the curve is not smooth.
    ///
    /// Flattened output contains these fractions exactly.
    fn kinks(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Maps a fraction of the arc length to the curve parameter fraction.
    ///
    /// Identity for curves parameterized by arc length; Béziers override
    /// this with a bisection search.
    fn parameter_at(&self, length_fraction: f64) -> f64 {
        length_fraction
    }

    /// Position at `fraction`, displaced laterally by `offset`.
    ///
    /// Positive offsets displace to the left of the direction of travel.
    fn offset_point(&self, fraction: f64, offset: &PiecewiseLinearOffset) -> Point2 {
        let normal = perpendicular(&unit_vector(self.direction(fraction)));
        self.point(fraction) + normal * offset.value(fraction)
    }

    /// Tangent heading at `fraction` of the laterally offset curve.
    ///
    /// A sloped offset tilts the tangent by `atan(d_offset / d_arclength)`.
    fn offset_direction(&self, fraction: f64, offset: &PiecewiseLinearOffset) -> f64 {
        let length = self.length();
        if length < TOLERANCE {
            return self.direction(fraction);
        }
        self.direction(fraction) + (offset.derivative(fraction) / length).atan()
    }

    /// Start point, `point(0.0)`.
    fn start_point(&self) -> Point2 {
        self.point(0.0)
    }

    /// End point, `point(1.0)`.
    fn end_point(&self) -> Point2 {
        self.point(1.0)
    }

    /// Flattens the curve into a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if an angle-bounded flattener stalls around an
    /// undeclared kink.
    fn to_polyline(&self, flattener: &Flattener) -> Result<Polyline>
    where
        Self: Sized,
    {
        flattener.flatten(self)
    }

    /// Flattens the laterally offset curve into a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if an angle-bounded flattener stalls around an
    /// undeclared kink.
    fn to_polyline_offset(
        &self,
        flattener: &Flattener,
        offset: &PiecewiseLinearOffset,
    ) -> Result<Polyline>
    where
        Self: Sized,
    {
        flattener.flatten_offset(self, offset)
    }
}
