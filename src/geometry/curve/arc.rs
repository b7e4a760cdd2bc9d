use crate::error::{GeometryError, Result};
use crate::geometry::directed::DirectedPoint2;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::{unit_vector, Point2, TOLERANCE};

use super::Curve;

/// Turn sense of an arc along its direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Counterclockwise; the center lies to the left of travel.
    Left,
    /// Clockwise; the center lies to the right of travel.
    Right,
}

impl Turn {
    /// Returns `+1.0` for a left turn, `-1.0` for a right turn.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Turn::Left => 1.0,
            Turn::Right => -1.0,
        }
    }

    /// Turn matching the sign of a curvature or angle value.
    #[must_use]
    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Turn::Right
        } else {
            Turn::Left
        }
    }
}

/// A circular arc defined by a directed start point, a radius, a turn
/// sense, and a swept angle.
///
/// The center is computed once at construction:
/// `center = start + turn_sign * radius * left_normal(heading)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    start: DirectedPoint2,
    radius: f64,
    turn: Turn,
    angle: f64,
    center: Point2,
    /// Angle of the start point around the center.
    start_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Errors
    ///
    /// Returns an error if `radius` is not positive and finite, or `angle`
    /// is negative or non-finite.
    pub fn new(start: DirectedPoint2, radius: f64, turn: Turn, angle: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "arc radius must be positive, got {radius}"
            ))
            .into());
        }
        if !angle.is_finite() || angle < 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "arc sweep angle must be non-negative, got {angle}"
            ))
            .into());
        }
        let center = start.position() + start.normal() * (turn.sign() * radius);
        let to_start = start.position() - center;
        let start_angle = to_start.y.atan2(to_start.x);
        Ok(Self {
            start,
            radius,
            turn,
            angle,
            center,
            start_angle,
        })
    }

    /// Returns the directed start point.
    #[must_use]
    pub fn start(&self) -> DirectedPoint2 {
        self.start
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the turn sense.
    #[must_use]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Returns the swept angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Returns the center of the arc circle.
    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    /// Angle around the center at `fraction`.
    fn angle_at(&self, fraction: f64) -> f64 {
        self.start_angle + self.turn.sign() * self.angle * fraction
    }
}

impl Curve for Arc {
    fn length(&self) -> f64 {
        self.radius * self.angle
    }

    fn point(&self, fraction: f64) -> Point2 {
        self.center + unit_vector(self.angle_at(fraction)) * self.radius
    }

    fn direction(&self, fraction: f64) -> f64 {
        self.start.heading() + self.turn.sign() * self.angle * fraction
    }

    fn start_curvature(&self) -> f64 {
        self.turn.sign() / self.radius
    }

    fn end_curvature(&self) -> f64 {
        self.turn.sign() / self.radius
    }

    fn offset_point(&self, fraction: f64, offset: &PiecewiseLinearOffset) -> Point2 {
        // A lateral offset of a concentric arc changes the effective
        // radius: moving left shrinks a left turn and widens a right turn.
        let effective = self.radius - self.turn.sign() * offset.value(fraction);
        self.center + unit_vector(self.angle_at(fraction)) * effective
    }
}
