use std::cell::OnceCell;

use crate::error::{GeometryError, Result, TessellationError};
use crate::geometry::directed::DirectedPoint3;
use crate::math::quadrature::legendre_gauss_24;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::tessellation::Polyline3;

use super::cubic_bezier::bernstein3;

/// A spatial cubic Bézier curve with four control points.
///
/// The planar [`Curve`](super::Curve) contract (scalar headings, lateral
/// offsets, adaptive flattening) does not apply in 3D; this variant
/// exposes direct evaluation and fixed-count flattening only.
#[derive(Debug, Clone)]
pub struct CubicBezier3 {
    points: [Point3; 4],
    /// Control vectors of the derivative (quadratic) Bézier.
    derivative: OnceCell<[Vector3; 3]>,
    length: OnceCell<f64>,
}

impl CubicBezier3 {
    /// Creates a spatial cubic Bézier from its four control points.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is non-finite.
    pub fn new(points: [Point3; 4]) -> Result<Self> {
        for p in &points {
            if !p.x.is_finite() || !p.y.is_finite() || !p.z.is_finite() {
                return Err(GeometryError::Degenerate(
                    "control point coordinates must be finite".into(),
                )
                .into());
            }
        }
        Ok(Self {
            points,
            derivative: OnceCell::new(),
            length: OnceCell::new(),
        })
    }

    /// Creates a spatial cubic Bézier between two directed endpoints.
    ///
    /// Each interior control point is placed at `shape * distance / 2`
    /// along the respective endpoint's direction, where `distance` is the
    /// endpoint separation.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide or `shape` is not
    /// positive and finite.
    pub fn from_directed_endpoints(
        start: DirectedPoint3,
        end: DirectedPoint3,
        shape: f64,
    ) -> Result<Self> {
        if !shape.is_finite() || shape <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "shape factor must be positive, got {shape}"
            ))
            .into());
        }
        let distance = (end.position() - start.position()).norm();
        if distance < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cannot span a Bézier between coincident endpoints".into(),
            )
            .into());
        }
        let reach = shape * distance / 2.0;
        Self::new([
            start.position(),
            start.position() + start.direction() * reach,
            end.position() - end.direction() * reach,
            end.position(),
        ])
    }

    /// Returns the four control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point3; 4] {
        &self.points
    }

    fn derivative_points(&self) -> &[Vector3; 3] {
        self.derivative.get_or_init(|| {
            [
                (self.points[1] - self.points[0]) * 3.0,
                (self.points[2] - self.points[1]) * 3.0,
                (self.points[3] - self.points[2]) * 3.0,
            ]
        })
    }

    /// First derivative with respect to the Bézier parameter.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vector3 {
        let [d0, d1, d2] = self.derivative_points();
        let u = 1.0 - t;
        d0 * (u * u) + d1 * (2.0 * u * t) + d2 * (t * t)
    }

    /// Total arc length, by fixed 24-point Legendre-Gauss quadrature.
    #[must_use]
    pub fn length(&self) -> f64 {
        *self
            .length
            .get_or_init(|| legendre_gauss_24(|t| self.derivative_at(t).norm(), 0.0, 1.0))
    }

    /// Position at `fraction` of the Bézier parameter.
    #[must_use]
    pub fn point(&self, fraction: f64) -> Point3 {
        let mut sum = Vector3::zeros();
        for (i, p) in self.points.iter().enumerate() {
            sum += p.coords * bernstein3(i, fraction);
        }
        Point3::from(sum)
    }

    /// Unit tangent at `fraction`.
    ///
    /// Degenerate parameters (a collapsed leg at an endpoint) are nudged
    /// inward until the derivative is usable.
    #[must_use]
    pub fn direction(&self, fraction: f64) -> Vector3 {
        let mut t = fraction;
        let mut d = self.derivative_at(t);
        if d.norm() < TOLERANCE {
            t = if fraction < 0.5 { t + 1e-6 } else { t - 1e-6 };
            d = self.derivative_at(t);
        }
        let n = d.norm();
        if n < TOLERANCE {
            return Vector3::zeros();
        }
        d / n
    }

    /// Start point, `point(0.0)`.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.points[0]
    }

    /// End point, `point(1.0)`.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.points[3]
    }

    /// Flattens the curve by uniform sampling into `segments` chords.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero.
    pub fn to_polyline(&self, segments: usize) -> Result<Polyline3> {
        if segments == 0 {
            return Err(TessellationError::InvalidParameters(
                "segment count must be at least 1".into(),
            )
            .into());
        }
        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / segments as f64;
        let points = (0..=segments)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let fraction = (i as f64 * step).min(1.0);
                self.point(fraction)
            })
            .collect();
        Polyline3::new(points)
    }
}
