use std::cell::{OnceCell, RefCell};

use crate::error::{GeometryError, Result};
use crate::geometry::directed::DirectedPoint2;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::intersect_2d::point_to_line_dist;
use crate::math::quadrature::{binomial, legendre_gauss_24};
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

use super::bezier_offset::{build_segments, locate, OffsetSegment};
use super::Curve;

/// Bisection tolerance for mapping arc length to the curve parameter.
const PARAMETER_TOLERANCE: f64 = 1e-6;

/// A planar cubic Bézier curve with four control points.
///
/// Evaluated in the Bernstein basis; the fraction argument of the
/// [`Curve`] contract is the native Bézier parameter, not an arc-length
/// fraction. Arc length is estimated by fixed 24-point Legendre-Gauss
/// quadrature over the derivative's magnitude.
#[derive(Debug)]
pub struct CubicBezier {
    points: [Point2; 4],
    /// Control vectors of the derivative (quadratic) Bézier.
    derivative: OnceCell<[Vector2; 3]>,
    length: OnceCell<f64>,
    /// Offset sub-segments, valid for one offset function instance.
    offset_cache: RefCell<Option<OffsetCache>>,
}

impl Clone for CubicBezier {
    /// A clone starts with an empty offset cache. Offset segmentation
    /// clones the curve while the source's cache cell is in use, so the
    /// cell itself must never be read here.
    fn clone(&self) -> Self {
        Self {
            points: self.points,
            derivative: self.derivative.clone(),
            length: self.length.clone(),
            offset_cache: RefCell::new(None),
        }
    }
}

#[derive(Debug, Clone)]
struct OffsetCache {
    key: PiecewiseLinearOffset,
    segments: Vec<OffsetSegment>,
}

/// Bernstein polynomial `B_{i,3}(t)`.
pub(super) fn bernstein3(i: usize, t: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let coeff = binomial(3, i as u64) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let power = i as i32;
    coeff * t.powi(power) * (1.0 - t).powi(3 - power)
}

impl CubicBezier {
    /// Creates a cubic Bézier from its four control points.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is non-finite.
    pub fn new(points: [Point2; 4]) -> Result<Self> {
        for p in &points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(GeometryError::Degenerate(
                    "control point coordinates must be finite".into(),
                )
                .into());
            }
        }
        Ok(Self::from_points_unchecked(points))
    }

    /// Builds a curve from control points known to be valid (splitting,
    /// offsetting).
    pub(super) fn from_points_unchecked(points: [Point2; 4]) -> Self {
        Self {
            points,
            derivative: OnceCell::new(),
            length: OnceCell::new(),
            offset_cache: RefCell::new(None),
        }
    }

    /// Creates a cubic Bézier between two directed endpoints.
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
        start: DirectedPoint2,
        end: DirectedPoint2,
        shape: f64,
    ) -> Result<Self> {
        let distance = Self::endpoint_distance(start, end, shape)?;
        let reach = shape * distance / 2.0;
        Ok(Self::from_points_unchecked([
            start.position(),
            start.position() + start.direction() * reach,
            end.position() - end.direction() * reach,
            end.position(),
        ]))
    }

    /// Creates a cubic Bézier between two directed endpoints, weighting
    /// each control point by the distance from its endpoint to the other
    /// endpoint's extended tangent line.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide, `shape` is not positive
    /// and finite, or either endpoint lies on the other's tangent line
    /// (the weight degenerates to zero).
    pub fn from_directed_endpoints_weighted(
        start: DirectedPoint2,
        end: DirectedPoint2,
        shape: f64,
    ) -> Result<Self> {
        Self::endpoint_distance(start, end, shape)?;
        let start_weight =
            point_to_line_dist(&start.position(), &end.position(), &end.direction());
        let end_weight =
            point_to_line_dist(&end.position(), &start.position(), &start.direction());
        if start_weight < TOLERANCE || end_weight < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "endpoint lies on the other endpoint's tangent line".into(),
            )
            .into());
        }
        Ok(Self::from_points_unchecked([
            start.position(),
            start.position() + start.direction() * (shape * start_weight / 2.0),
            end.position() - end.direction() * (shape * end_weight / 2.0),
            end.position(),
        ]))
    }

    fn endpoint_distance(start: DirectedPoint2, end: DirectedPoint2, shape: f64) -> Result<f64> {
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
        Ok(distance)
    }

    /// Returns the four control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point2; 4] {
        &self.points
    }

    /// Control vectors of the derivative curve, `3 * (P[i+1] - P[i])`.
    pub(super) fn derivative_points(&self) -> &[Vector2; 3] {
        self.derivative.get_or_init(|| {
            [
                (self.points[1] - self.points[0]) * 3.0,
                (self.points[2] - self.points[1]) * 3.0,
                (self.points[3] - self.points[2]) * 3.0,
            ]
        })
    }

    /// First derivative (velocity) at `t`.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vector2 {
        let [d0, d1, d2] = self.derivative_points();
        let u = 1.0 - t;
        d0 * (u * u) + d1 * (2.0 * u * t) + d2 * (t * t)
    }

    /// Second derivative at `t`.
    #[must_use]
    pub fn second_derivative_at(&self, t: f64) -> Vector2 {
        let [d0, d1, d2] = self.derivative_points();
        let e0 = (d1 - d0) * 2.0;
        let e1 = (d2 - d1) * 2.0;
        e0 * (1.0 - t) + e1 * t
    }

    /// Signed curvature at `t`: `(x'y'' - y'x'') / (x'^2 + y'^2)^1.5`.
    #[must_use]
    pub fn curvature_at(&self, t: f64) -> f64 {
        let d1 = self.derivative_at(t);
        let speed_sq = d1.norm_squared();
        if speed_sq < TOLERANCE * TOLERANCE {
            return 0.0;
        }
        cross_2d(&d1, &self.second_derivative_at(t)) / speed_sq.powf(1.5)
    }

    /// Tangent vector at `t`, nudged inward when the derivative vanishes
    /// at a degenerate endpoint.
    fn tangent_at(&self, t: f64) -> Vector2 {
        let d = self.derivative_at(t);
        if d.norm() > TOLERANCE {
            return d;
        }
        let nudged = if t < 0.5 { t + 1e-6 } else { t - 1e-6 };
        self.derivative_at(nudged)
    }

    /// Splits the curve at parameter `t` by de Casteljau bisection,
    /// yielding two cubic Béziers covering `[0, t]` and `[t, 1]`.
    #[must_use]
    pub fn split(&self, t: f64) -> (Self, Self) {
        let [p0, p1, p2, p3] = self.points;
        let q0 = p0.coords.lerp(&p1.coords, t);
        let q1 = p1.coords.lerp(&p2.coords, t);
        let q2 = p2.coords.lerp(&p3.coords, t);
        let r0 = q0.lerp(&q1, t);
        let r1 = q1.lerp(&q2, t);
        let s = r0.lerp(&r1, t);
        (
            Self::from_points_unchecked([p0, Point2::from(q0), Point2::from(r0), Point2::from(s)]),
            Self::from_points_unchecked([Point2::from(s), Point2::from(r1), Point2::from(q2), p3]),
        )
    }

    /// Endpoint curvature from the control polygon:
    /// `kappa = 2/3 * h / a^2` with `a` the length of the adjacent leg
    /// and `h` the distance of the next control point from that leg's
    /// line. The 2/3 scale is carried over as documented; tests pin the
    /// value against the parametric formula.
    fn polygon_curvature(anchor: Point2, leg: Point2, witness: Point2) -> Option<f64> {
        let a = (leg - anchor).norm();
        if a < TOLERANCE {
            return None;
        }
        let h = point_to_line_dist(&witness, &anchor, &(leg - anchor));
        let sign = cross_2d(&(leg - anchor), &(witness - leg)).signum();
        Some(2.0 / 3.0 * h / (a * a) * sign)
    }

    fn with_offset_segments<R>(
        &self,
        offset: &PiecewiseLinearOffset,
        f: impl FnOnce(&[OffsetSegment]) -> R,
    ) -> R {
        let stale = !self
            .offset_cache
            .borrow()
            .as_ref()
            .is_some_and(|c| c.key == *offset);
        if stale {
            // build_segments re-enters the curve (clone, split, parameter
            // lookups); the cache cell must stay unborrowed while it runs.
            let segments = build_segments(self, offset);
            *self.offset_cache.borrow_mut() = Some(OffsetCache {
                key: offset.clone(),
                segments,
            });
        }
        let cache = self.offset_cache.borrow();
        match cache.as_ref() {
            Some(c) => f(&c.segments),
            // Unreachable: the stale path above always populates the cache.
            None => f(&build_segments(self, offset)),
        }
    }
}

impl Curve for CubicBezier {
    fn length(&self) -> f64 {
        *self
            .length
            .get_or_init(|| legendre_gauss_24(|t| self.derivative_at(t).norm(), 0.0, 1.0))
    }

    fn point(&self, fraction: f64) -> Point2 {
        let mut acc = Vector2::zeros();
        for (i, p) in self.points.iter().enumerate() {
            acc += p.coords * bernstein3(i, fraction);
        }
        Point2::from(acc)
    }

    fn direction(&self, fraction: f64) -> f64 {
        let d = self.tangent_at(fraction);
        d.y.atan2(d.x)
    }

    fn start_curvature(&self) -> f64 {
        Self::polygon_curvature(self.points[0], self.points[1], self.points[2])
            .unwrap_or_else(|| self.curvature_at(0.0))
    }

    fn end_curvature(&self) -> f64 {
        Self::polygon_curvature(self.points[3], self.points[2], self.points[1])
            .map_or_else(|| self.curvature_at(1.0), |k| -k)
    }

    fn parameter_at(&self, length_fraction: f64) -> f64 {
        let target = length_fraction.clamp(0.0, 1.0) * self.length();
        let mut lo = 0.0;
        let mut hi = 1.0;
        while hi - lo > PARAMETER_TOLERANCE {
            let mid = 0.5 * (lo + hi);
            let (head, _) = self.split(mid);
            if head.length() < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    fn offset_point(&self, fraction: f64, offset: &PiecewiseLinearOffset) -> Point2 {
        self.with_offset_segments(offset, |segments| {
            let (segment, local) = locate(segments, fraction);
            segment.curve.point(local)
        })
    }

    fn offset_direction(&self, fraction: f64, offset: &PiecewiseLinearOffset) -> f64 {
        self.with_offset_segments(offset, |segments| {
            let (segment, local) = locate(segments, fraction);
            segment.curve.direction(local)
        })
    }
}
