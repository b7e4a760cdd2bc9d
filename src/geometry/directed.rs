use crate::error::{GeometryError, Result};
use crate::math::{perpendicular, unit_vector, Point2, Point3, Vector2, Vector3, TOLERANCE};

/// A 2D position with a heading.
///
/// The heading is a scalar angle in radians, measured counterclockwise
/// from the positive x-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedPoint2 {
    position: Point2,
    heading: f64,
}

impl DirectedPoint2 {
    /// Creates a directed point from a position and heading angle.
    #[must_use]
    pub fn new(position: Point2, heading: f64) -> Self {
        Self { position, heading }
    }

    /// Creates a directed point at `from`, heading toward `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two points coincide.
    pub fn from_points(from: Point2, to: Point2) -> Result<Self> {
        let d = to - from;
        if d.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cannot derive a heading from coincident points".into(),
            )
            .into());
        }
        Ok(Self {
            position: from,
            heading: d.y.atan2(d.x),
        })
    }

    /// Returns the position.
    #[must_use]
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Returns the heading angle in radians.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Returns the unit vector along the heading.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        unit_vector(self.heading)
    }

    /// Returns the unit normal to the left of the heading.
    #[must_use]
    pub fn normal(&self) -> Vector2 {
        perpendicular(&self.direction())
    }
}

/// A 3D position with a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedPoint3 {
    position: Point3,
    direction: Vector3,
}

impl DirectedPoint3 {
    /// Creates a directed point from a position and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction is zero-length.
    pub fn new(position: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            position,
            direction: direction / len,
        })
    }

    /// Creates a directed point at `from`, pointing toward `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two points coincide.
    pub fn from_points(from: Point3, to: Point3) -> Result<Self> {
        Self::new(from, to - from)
    }

    /// Returns the position.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Returns the unit direction.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        self.direction
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn from_points_derives_heading() {
        let dp =
            DirectedPoint2::from_points(Point2::new(1.0, 1.0), Point2::new(1.0, 3.0)).unwrap();
        assert!((dp.heading() - FRAC_PI_2).abs() < TOLERANCE);
        assert!((dp.direction() - Vector2::new(0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn normal_points_left() {
        let dp = DirectedPoint2::new(Point2::origin(), 0.0);
        assert!((dp.normal() - Vector2::new(0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn coincident_points_fail() {
        let result = DirectedPoint2::from_points(Point2::new(2.0, 2.0), Point2::new(2.0, 2.0));
        assert!(result.is_err());
    }

    #[test]
    fn directed_point_3d_normalizes() {
        let dp = DirectedPoint3::new(Point3::origin(), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert!((dp.direction().norm() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn zero_direction_3d_fails() {
        let result = DirectedPoint3::new(Point3::origin(), Vector3::zeros());
        assert!(result.is_err());
    }
}
