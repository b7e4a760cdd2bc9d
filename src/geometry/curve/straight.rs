use crate::error::{GeometryError, Result};
use crate::geometry::directed::DirectedPoint2;
use crate::math::{Point2, TOLERANCE};

use super::Curve;

/// A straight segment: `point(f) = start + f * length * direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Straight {
    start: DirectedPoint2,
    length: f64,
}

impl Straight {
    /// Creates a straight segment from a directed start point and a length.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is not positive and finite.
    pub fn new(start: DirectedPoint2, length: f64) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "straight length must be positive, got {length}"
            ))
            .into());
        }
        Ok(Self { start, length })
    }

    /// Creates the straight segment from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide.
    pub fn between_points(from: Point2, to: Point2) -> Result<Self> {
        let start = DirectedPoint2::from_points(from, to)?;
        Self::new(start, (to - from).norm())
    }

    /// Returns the directed start point.
    #[must_use]
    pub fn start(&self) -> DirectedPoint2 {
        self.start
    }
}

impl Curve for Straight {
    fn length(&self) -> f64 {
        self.length
    }

    fn point(&self, fraction: f64) -> Point2 {
        self.start.position() + self.start.direction() * (fraction * self.length)
    }

    fn direction(&self, _fraction: f64) -> f64 {
        self.start.heading()
    }

    fn start_curvature(&self) -> f64 {
        0.0
    }

    fn end_curvature(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Curve;
    use crate::math::cross_2d;
    use crate::tessellation::Flattener;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn point_interpolates_linearly() {
        let s = Straight::new(DirectedPoint2::new(Point2::new(1.0, 2.0), 0.0), 4.0).unwrap();
        assert!((s.point(0.5) - Point2::new(3.0, 2.0)).norm() < TOLERANCE);
        assert!((s.end_point() - Point2::new(5.0, 2.0)).norm() < TOLERANCE);
    }

    #[test]
    fn direction_is_constant() {
        let s = Straight::new(DirectedPoint2::new(Point2::origin(), FRAC_PI_2), 1.0).unwrap();
        assert!((s.direction(0.0) - FRAC_PI_2).abs() < TOLERANCE);
        assert!((s.direction(1.0) - FRAC_PI_2).abs() < TOLERANCE);
        assert!(s.start_curvature().abs() < TOLERANCE);
        assert!(s.end_curvature().abs() < TOLERANCE);
    }

    #[test]
    fn between_points_hits_both_ends() {
        let s = Straight::between_points(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)).unwrap();
        assert!((s.length() - 5.0).abs() < TOLERANCE);
        assert!((s.end_point() - Point2::new(3.0, 4.0)).norm() < TOLERANCE);
    }

    #[test]
    fn non_positive_length_fails() {
        let start = DirectedPoint2::new(Point2::origin(), 0.0);
        assert!(Straight::new(start, 0.0).is_err());
        assert!(Straight::new(start, -1.0).is_err());
        assert!(Straight::new(start, f64::NAN).is_err());
    }

    #[test]
    fn fixed_count_flattening_is_uniform_and_collinear() {
        let s = Straight::new(DirectedPoint2::new(Point2::origin(), 0.5), 10.0).unwrap();
        for n in [1usize, 2, 5, 8] {
            let polyline = s
                .to_polyline(&Flattener::num_segments(n).unwrap())
                .unwrap();
            assert_eq!(polyline.len(), n + 1);
            let points = polyline.points();
            let chord = points[points.len() - 1] - points[0];
            for pair in points.windows(2) {
                let step = pair[1] - pair[0];
                // Uniform steps, all collinear with the chord.
                #[allow(clippy::cast_precision_loss)]
                let expected = 10.0 / n as f64;
                assert!((step.norm() - expected).abs() < 1e-9);
                assert!(cross_2d(&chord, &step).abs() < 1e-9);
            }
        }
    }
}
