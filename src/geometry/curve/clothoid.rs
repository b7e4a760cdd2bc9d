//! Clothoid (Euler spiral) segments.
//!
//! A clothoid's curvature varies linearly with arc length, which makes it
//! the standard transition element between straights and arcs in road
//! design. Positions come from the unit spiral `(C(t), S(t))` (Fresnel
//! integrals), placed into the world by a similarity transform plus an
//! optional mirror. Constructions whose endpoint angles fall within the
//! angular tolerance degenerate to a [`Straight`] or an [`Arc`] and
//! delegate all queries to it.

use std::cell::OnceCell;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{GeometryError, Result};
use crate::geometry::directed::DirectedPoint2;
use crate::math::fresnel::fresnel;
use crate::math::{angle_diff, rotate, Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

use super::arc::{Arc, Turn};
use super::straight::Straight;
use super::Curve;

const SECANT_MAX_ITERATIONS: usize = 100;
const SECANT_TOLERANCE: f64 = 1e-8;

/// Free angles beyond this would wind the spiral several times; the
/// bracket search gives up instead.
const MAX_FREE_ANGLE: f64 = 100.0;

/// Tangent angle of the unit spiral at parameter `t`.
fn tau(t: f64) -> f64 {
    FRAC_PI_2 * t * t
}

/// A non-degenerate spiral piece.
///
/// The piece covers `[t_start, t_end]` on the unit spiral (either order;
/// a descending range means the curve is traveled against the spiral's
/// own orientation). World position is
/// `origin + scale * R(rotation) * mirror(F(t) - F(t_start))`, plus a
/// lazily computed shift that distributes the solver's residual linearly
/// over the fraction domain so both endpoints are met exactly.
#[derive(Debug, Clone)]
struct Spiral {
    origin: Point2,
    rotation: f64,
    reflected: bool,
    /// `A * sqrt(pi)`; world arc length per unit of `t`.
    scale: f64,
    t_start: f64,
    t_end: f64,
    end_target: Option<Point2>,
    shift: OnceCell<Vector2>,
}

impl Spiral {
    fn t_at(&self, fraction: f64) -> f64 {
        self.t_start + fraction * (self.t_end - self.t_start)
    }

    /// `-1` when mirrored, which flips the turn sense.
    fn turn_sign(&self) -> f64 {
        if self.reflected {
            -1.0
        } else {
            1.0
        }
    }

    /// `-1` when traveling toward decreasing `t`.
    fn travel_sign(&self) -> f64 {
        if self.t_end < self.t_start {
            -1.0
        } else {
            1.0
        }
    }

    fn raw_point(&self, fraction: f64) -> Point2 {
        let (c0, s0) = fresnel(self.t_start);
        let (c, s) = fresnel(self.t_at(fraction));
        let mut local = Vector2::new(c - c0, s - s0);
        if self.reflected {
            local.y = -local.y;
        }
        self.origin + rotate(&local, self.rotation) * self.scale
    }

    fn shift(&self) -> Vector2 {
        *self.shift.get_or_init(|| {
            self.end_target
                .map_or_else(Vector2::zeros, |target| target - self.raw_point(1.0))
        })
    }

    fn point(&self, fraction: f64) -> Point2 {
        self.raw_point(fraction) + self.shift() * fraction
    }

    fn direction(&self, fraction: f64) -> f64 {
        let half_turn = if self.t_end < self.t_start { PI } else { 0.0 };
        self.rotation + self.turn_sign() * tau(self.t_at(fraction)) + half_turn
    }

    fn curvature(&self, fraction: f64) -> f64 {
        self.turn_sign() * self.travel_sign() * PI * self.t_at(fraction) / self.scale
    }

    fn length(&self) -> f64 {
        self.scale * (self.t_end - self.t_start).abs()
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Spiral(Spiral),
    Line(Straight),
    Arc(Arc),
}

/// A clothoid segment, possibly degenerated to a straight or an arc.
#[derive(Debug, Clone)]
pub struct Clothoid {
    kind: Kind,
}

impl Clothoid {
    /// Fits a clothoid between two directed endpoints (G1 Hermite data).
    ///
    /// If both endpoint directions are within the angular tolerance of
    /// the chord the result degenerates to a straight; if the two
    /// chord-relative angles are within tolerance of each other it
    /// degenerates to the closed-form arc through both endpoints.
    /// Otherwise the free angle of the spiral piece is solved with a
    /// bracketed secant iteration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide, if a heading opposes
    /// the chord, or if the secant solver fails to converge.
    pub fn from_directed_endpoints(start: DirectedPoint2, end: DirectedPoint2) -> Result<Self> {
        let chord = end.position() - start.position();
        let chord_length = chord.norm();
        if chord_length < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "clothoid endpoints must not coincide".into(),
            )
            .into());
        }
        let chord_angle = chord.y.atan2(chord.x);
        let phi1 = angle_diff(start.heading(), chord_angle);
        let phi2 = angle_diff(chord_angle, end.heading());

        if phi1.abs() < ANGLE_TOLERANCE && phi2.abs() < ANGLE_TOLERANCE {
            return Ok(Self {
                kind: Kind::Line(Straight::new(start, chord_length)?),
            });
        }
        if (phi1 - phi2).abs() < ANGLE_TOLERANCE {
            let half_sweep = phi1.abs();
            if half_sweep.sin() < TOLERANCE {
                return Err(GeometryError::Degenerate(
                    "endpoint headings oppose the chord".into(),
                )
                .into());
            }
            let radius = chord_length / (2.0 * half_sweep.sin());
            return Ok(Self {
                kind: Kind::Arc(Arc::new(
                    start,
                    radius,
                    Turn::from_sign(phi1),
                    2.0 * half_sweep,
                )?),
            });
        }

        // Normalize so the canonical piece travels toward increasing t
        // and turns left at its far end: solve the reversed problem when
        // the larger angle sits at the start, and mirror when the far
        // angle is negative.
        let reversed = phi1.abs() > phi2.abs();
        let (mut w1, mut w2) = if reversed {
            (-phi2, -phi1)
        } else {
            (phi1, phi2)
        };
        let reflected = w2 < 0.0;
        if reflected {
            w1 = -w1;
            w2 = -w2;
        }

        let (theta, c_branch) = solve_free_angle(w1, w2)?;
        let t_near = if c_branch {
            (2.0 * theta / PI).sqrt()
        } else {
            -(2.0 * theta / PI).sqrt()
        };
        let t_far = (2.0 * (theta + w1 + w2) / PI).sqrt();

        let (c_near, s_near) = fresnel(t_near);
        let (c_far, s_far) = fresnel(t_far);
        let canonical_chord = (c_far - c_near).hypot(s_far - s_near);
        if canonical_chord < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "clothoid fit collapsed to a zero-length chord".into(),
            )
            .into());
        }
        let scale = chord_length / canonical_chord;

        let (t_start, t_end) = if reversed {
            (t_far, t_near)
        } else {
            (t_near, t_far)
        };
        let turn_sign = if reflected { -1.0 } else { 1.0 };
        let half_turn = if reversed { PI } else { 0.0 };
        let rotation = start.heading() - turn_sign * tau(t_start) - half_turn;

        Ok(Self {
            kind: Kind::Spiral(Spiral {
                origin: start.position(),
                rotation,
                reflected,
                scale,
                t_start,
                t_end,
                end_target: Some(end.position()),
                shift: OnceCell::new(),
            }),
        })
    }

    /// Creates a clothoid from a directed start point, the clothoid
    /// parameter `A`, and the curvatures at both ends.
    ///
    /// The spiral window follows from `t = A * sqrt(pi) * curvature / pi`
    /// at each end, mirrored when the curvature decreases.
    ///
    /// # Errors
    ///
    /// Returns an error if `a_value` is not positive and finite, or the
    /// two curvatures are equal within tolerance (a straight or an arc,
    /// which carry no `A`).
    pub fn from_start_curvatures(
        start: DirectedPoint2,
        a_value: f64,
        start_curvature: f64,
        end_curvature: f64,
    ) -> Result<Self> {
        if !a_value.is_finite() || a_value <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "clothoid parameter A must be positive, got {a_value}"
            ))
            .into());
        }
        if (end_curvature - start_curvature).abs() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "curvatures must differ; use a straight or an arc instead".into(),
            )
            .into());
        }
        let scale = a_value * PI.sqrt();
        let turn_sign = if start_curvature <= end_curvature {
            1.0
        } else {
            -1.0
        };
        let t_start = turn_sign * start_curvature * scale / PI;
        let t_end = turn_sign * end_curvature * scale / PI;
        let rotation = start.heading() - turn_sign * tau(t_start);
        Ok(Self {
            kind: Kind::Spiral(Spiral {
                origin: start.position(),
                rotation,
                reflected: turn_sign < 0.0,
                scale,
                t_start,
                t_end,
                end_target: None,
                shift: OnceCell::new(),
            }),
        })
    }

    /// Creates a clothoid from a directed start point, an arc length, and
    /// the curvatures at both ends.
    ///
    /// Derives `A = sqrt(length / |curvature difference|)`. Equal
    /// curvatures degenerate to a straight (zero curvature) or an arc.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is not positive and finite.
    pub fn from_start_length(
        start: DirectedPoint2,
        length: f64,
        start_curvature: f64,
        end_curvature: f64,
    ) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "clothoid length must be positive, got {length}"
            ))
            .into());
        }
        let delta = end_curvature - start_curvature;
        if delta.abs() < TOLERANCE {
            if start_curvature.abs() < TOLERANCE {
                return Ok(Self {
                    kind: Kind::Line(Straight::new(start, length)?),
                });
            }
            let radius = 1.0 / start_curvature.abs();
            return Ok(Self {
                kind: Kind::Arc(Arc::new(
                    start,
                    radius,
                    Turn::from_sign(start_curvature),
                    length * start_curvature.abs(),
                )?),
            });
        }
        Self::from_start_curvatures(start, (length / delta.abs()).sqrt(), start_curvature, end_curvature)
    }

    /// Returns the clothoid parameter `A`, or `None` for a degenerate
    /// (straight or arc) instance.
    #[must_use]
    pub fn a_value(&self) -> Option<f64> {
        match &self.kind {
            Kind::Spiral(spiral) => Some(spiral.scale / PI.sqrt()),
            Kind::Line(_) | Kind::Arc(_) => None,
        }
    }

    /// `true` when the construction degenerated to a straight or an arc.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self.kind, Kind::Line(_) | Kind::Arc(_))
    }
}

impl Curve for Clothoid {
    fn length(&self) -> f64 {
        match &self.kind {
            Kind::Spiral(spiral) => spiral.length(),
            Kind::Line(line) => line.length(),
            Kind::Arc(arc) => arc.length(),
        }
    }

    fn point(&self, fraction: f64) -> Point2 {
        match &self.kind {
            Kind::Spiral(spiral) => spiral.point(fraction),
            Kind::Line(line) => line.point(fraction),
            Kind::Arc(arc) => arc.point(fraction),
        }
    }

    fn direction(&self, fraction: f64) -> f64 {
        match &self.kind {
            Kind::Spiral(spiral) => spiral.direction(fraction),
            Kind::Line(line) => line.direction(fraction),
            Kind::Arc(arc) => arc.direction(fraction),
        }
    }

    fn start_curvature(&self) -> f64 {
        match &self.kind {
            Kind::Spiral(spiral) => spiral.curvature(0.0),
            Kind::Line(line) => line.start_curvature(),
            Kind::Arc(arc) => arc.start_curvature(),
        }
    }

    fn end_curvature(&self) -> f64 {
        match &self.kind {
            Kind::Spiral(spiral) => spiral.curvature(1.0),
            Kind::Line(line) => line.end_curvature(),
            Kind::Arc(arc) => arc.end_curvature(),
        }
    }
}

/// Residual of the G1 fit for a candidate free angle `theta`.
///
/// The canonical piece runs from `t_near = ±sqrt(2 theta / pi)` (positive
/// on the C branch, negative on the S branch, where the piece crosses its
/// inflection) to `t_far = sqrt(2 (theta + w1 + w2) / pi)`. The residual
/// is proportional to the sine of the angle between the piece's chord and
/// the required chord direction `theta + w1`; a root makes them parallel.
fn residual(theta: f64, w1: f64, w2: f64, c_branch: bool) -> f64 {
    let magnitude = (2.0 * theta / PI).sqrt();
    let t_near = if c_branch { magnitude } else { -magnitude };
    // The angle sum is non-negative after normalization; clamp away the
    // rounding residue of an antisymmetric pair.
    let t_far = (2.0 * (theta + w1 + w2).max(0.0) / PI).sqrt();
    let (c_near, s_near) = fresnel(t_near);
    let (c_far, s_far) = fresnel(t_far);
    let (delta_c, delta_s) = (c_far - c_near, s_far - s_near);
    let required = theta + w1;
    delta_c * required.sin() - delta_s * required.cos()
}

/// Solves `residual(theta) = 0` for the normalized angles `w1`, `w2`.
///
/// The sign of the residual at `theta = 0` picks the branch: positive
/// means the piece starts past the inflection (C-shaped), negative means
/// the inflection lies inside the piece (S-shaped). The root is bracketed
/// by doubling and refined with a secant iteration clamped to the
/// bracket.
fn solve_free_angle(w1: f64, w2: f64) -> Result<(f64, bool)> {
    // An antisymmetric pair (vanishing angle sum) zeroes the residual at
    // theta = 0 by collapsing the piece, not by solving it; only the S
    // branch resolves that configuration.
    let (c_branch, start, at_start) = if w1 + w2 < ANGLE_TOLERANCE {
        let start = SECANT_TOLERANCE;
        (false, start, residual(start, w1, w2, false))
    } else {
        let at_zero = residual(0.0, w1, w2, true);
        if at_zero.abs() < SECANT_TOLERANCE {
            return Ok((0.0, true));
        }
        (at_zero > 0.0, 0.0, at_zero)
    };

    let mut hi = 1e-3;
    let mut at_hi = residual(hi, w1, w2, c_branch);
    while (at_hi > 0.0) == (at_start > 0.0) {
        hi *= 2.0;
        if hi > MAX_FREE_ANGLE {
            return Err(GeometryError::NoConvergence {
                solver: "clothoid free-angle bracket",
                iterations: SECANT_MAX_ITERATIONS,
            }
            .into());
        }
        at_hi = residual(hi, w1, w2, c_branch);
    }

    let mut lo = start;
    let mut at_lo = at_start;
    let (mut x0, mut f0) = (lo, at_lo);
    let (mut x1, mut f1) = (hi, at_hi);
    for _ in 0..SECANT_MAX_ITERATIONS {
        let denominator = f1 - f0;
        let mut x2 = if denominator.abs() < f64::MIN_POSITIVE {
            0.5 * (lo + hi)
        } else {
            x1 - f1 * (x1 - x0) / denominator
        };
        if !(lo..=hi).contains(&x2) {
            x2 = 0.5 * (lo + hi);
        }
        let f2 = residual(x2, w1, w2, c_branch);
        if f2.abs() < SECANT_TOLERANCE || hi - lo < SECANT_TOLERANCE {
            return Ok((x2, c_branch));
        }
        if (f2 > 0.0) == (at_lo > 0.0) {
            lo = x2;
            at_lo = f2;
        } else {
            hi = x2;
        }
        (x0, f0) = (x1, f1);
        (x1, f1) = (x2, f2);
    }
    Err(GeometryError::NoConvergence {
        solver: "clothoid secant",
        iterations: SECANT_MAX_ITERATIONS,
    }
    .into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Curve;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn dp(x: f64, y: f64, heading: f64) -> DirectedPoint2 {
        DirectedPoint2::new(Point2::new(x, y), heading)
    }

    #[test]
    fn collinear_endpoints_degenerate_to_straight() {
        let heading = 4.0_f64.atan2(3.0);
        let c = Clothoid::from_directed_endpoints(dp(1.0, 2.0, heading), dp(4.0, 6.0, heading))
            .unwrap();
        assert!(c.is_degenerate());
        assert!(c.a_value().is_none());
        assert_relative_eq!(c.length(), 5.0, epsilon = 1e-9);
        assert!((c.point(0.5) - Point2::new(2.5, 4.0)).norm() < 1e-9);
        assert!(c.start_curvature().abs() < TOLERANCE);
    }

    #[test]
    fn symmetric_endpoints_degenerate_to_arc() {
        let c = Clothoid::from_directed_endpoints(dp(0.0, 0.0, 0.0), dp(10.0, 10.0, FRAC_PI_2))
            .unwrap();
        assert!(c.is_degenerate());
        // Quarter circle of radius 10.
        assert_relative_eq!(c.length(), 10.0 * FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(c.start_curvature(), 0.1, epsilon = 1e-9);
        assert!((c.point(1.0) - Point2::new(10.0, 10.0)).norm() < 1e-9);
        assert!(angle_diff(c.direction(1.0), FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn curvature_window_from_a_value() {
        let c = Clothoid::from_start_curvatures(dp(0.0, 0.0, 0.0), 2.0, 0.0, 0.5).unwrap();
        assert!(!c.is_degenerate());
        // length = A^2 * |curvature difference|
        assert_relative_eq!(c.length(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(c.start_curvature(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(c.end_curvature(), 0.5, epsilon = 1e-9);
        assert!((c.point(0.0) - Point2::origin()).norm() < TOLERANCE);
        assert!(angle_diff(0.0, c.direction(0.0)).abs() < 1e-9);
        // Total turn is the integral of the linear curvature: mean * length.
        assert_relative_eq!(angle_diff(0.0, c.direction(1.0)), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn decreasing_curvature_mirrors_the_spiral() {
        let c = Clothoid::from_start_curvatures(dp(0.0, 0.0, 0.0), 2.0, 0.5, 0.0).unwrap();
        assert_relative_eq!(c.start_curvature(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(c.end_curvature(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(c.length(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(angle_diff(0.0, c.direction(1.0)), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn length_mode_derives_a_value() {
        let c = Clothoid::from_start_length(dp(0.0, 0.0, 0.0), 10.0, 0.0, 0.1).unwrap();
        assert_relative_eq!(c.a_value().unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.length(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.end_curvature(), 0.1, epsilon = 1e-9);
        assert_relative_eq!(angle_diff(0.0, c.direction(1.0)), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn length_mode_with_equal_curvatures_degenerates() {
        let line = Clothoid::from_start_length(dp(0.0, 0.0, 0.0), 10.0, 0.0, 0.0).unwrap();
        assert!(line.is_degenerate());
        assert_relative_eq!(line.length(), 10.0, epsilon = 1e-9);
        assert!((line.point(1.0) - Point2::new(10.0, 0.0)).norm() < 1e-9);

        let arc = Clothoid::from_start_length(dp(0.0, 0.0, 0.0), 10.0, 0.2, 0.2).unwrap();
        assert!(arc.is_degenerate());
        assert_relative_eq!(arc.length(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(arc.start_curvature(), 0.2, epsilon = 1e-9);
        assert_relative_eq!(angle_diff(0.0, arc.direction(1.0)), 2.0, epsilon = 1e-9);

        let right = Clothoid::from_start_length(dp(0.0, 0.0, 0.0), 10.0, -0.2, -0.2).unwrap();
        assert_relative_eq!(right.end_curvature(), -0.2, epsilon = 1e-9);
    }

    #[test]
    fn endpoint_fit_recovers_known_spirals() {
        // C-shaped, C-shaped reversed, mirrored, and S-shaped windows.
        let cases = [(0.1, 0.3), (0.3, 0.1), (-0.1, -0.3), (-0.05, 0.25)];
        let start = dp(1.0, -2.0, 0.4);
        for (k_start, k_end) in cases {
            let reference =
                Clothoid::from_start_curvatures(start, 5.0, k_start, k_end).unwrap();
            let end = DirectedPoint2::new(reference.point(1.0), reference.direction(1.0));
            let fitted = Clothoid::from_directed_endpoints(start, end).unwrap();
            assert!(!fitted.is_degenerate(), "case {k_start} -> {k_end}");

            // Both endpoints are met exactly; the single-piece G1 fit is
            // unique, so the interior must agree too.
            assert!((fitted.point(0.0) - start.position()).norm() < 1e-9);
            assert!((fitted.point(1.0) - end.position()).norm() < 1e-9);
            assert!(angle_diff(fitted.direction(0.0), start.heading()).abs() < 1e-9);
            assert!(angle_diff(fitted.direction(1.0), end.heading()).abs() < 1e-6);
            assert!((fitted.length() - reference.length()).abs() < 1e-3);
            assert!((fitted.a_value().unwrap() - 5.0).abs() < 1e-3);
            for fraction in [0.25, 0.5, 0.75] {
                let deviation = (fitted.point(fraction) - reference.point(fraction)).norm();
                assert!(
                    deviation < 1e-4,
                    "case {k_start} -> {k_end}: deviation {deviation} at {fraction}"
                );
            }
        }
    }

    #[test]
    fn parallel_headings_fit_an_antisymmetric_s() {
        // Equal start and end headings tilted off the chord: the fit
        // straddles the inflection symmetrically.
        let fitted =
            Clothoid::from_directed_endpoints(dp(0.0, 0.0, 0.3), dp(10.0, 0.0, 0.3)).unwrap();
        assert!(!fitted.is_degenerate());
        assert!((fitted.point(1.0) - Point2::new(10.0, 0.0)).norm() < 1e-9);
        assert!(angle_diff(fitted.direction(1.0), 0.3).abs() < 1e-6);
        // Curvature is odd around the inflection, and the curve crosses
        // the chord at its midpoint.
        assert!((fitted.start_curvature() + fitted.end_curvature()).abs() < 1e-6);
        assert!(fitted.start_curvature() < 0.0);
        assert!((fitted.point(0.5) - Point2::new(5.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn invalid_constructions_fail() {
        let start = dp(0.0, 0.0, 0.0);
        assert!(Clothoid::from_directed_endpoints(start, dp(0.0, 0.0, 1.0)).is_err());
        assert!(Clothoid::from_start_curvatures(start, 0.0, 0.0, 0.1).is_err());
        assert!(Clothoid::from_start_curvatures(start, -1.0, 0.0, 0.1).is_err());
        assert!(Clothoid::from_start_curvatures(start, 1.0, 0.2, 0.2).is_err());
        assert!(Clothoid::from_start_length(start, 0.0, 0.0, 0.1).is_err());
        assert!(Clothoid::from_start_length(start, -2.0, 0.0, 0.1).is_err());
    }
}
