//! Adaptive flattening by recursive midpoint insertion.

use std::f64::consts::FRAC_PI_2;

use crate::error::{Result, TessellationError};
use crate::geometry::curve::Curve;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::intersect_2d::point_to_segment_dist;
use crate::math::{angle_diff, cross_2d, Point2, TOLERANCE};

use super::seed_fractions;

/// Consecutive insertions around one point before flattening gives up.
///
/// Only armed when an angle bound is active; hitting it signals an
/// undeclared kink or an unreachable tolerance.
const MAX_CONSECUTIVE_INSERTIONS: usize = 50;

/// Intervals whose span has collapsed to the floating-point grain are
/// accepted unconditionally; the safety valve fires well before this.
const MIN_INTERVAL: f64 = f64::EPSILON;

/// Direction probes are pulled this far (as a fraction of the interval
/// span) toward the interior, so an interval bounded by a kink fraction
/// sees its own side of the corner.
const DIRECTION_NUDGE: f64 = 1e-9;

/// Stopping criteria for one flattening run.
pub(super) struct Limits {
    pub deviation: Option<f64>,
    pub angle: Option<f64>,
    /// Insert when endpoint directions differ by more than 90 degrees.
    pub loopback: bool,
}

/// Evaluates a curve either directly or through its offset functions.
struct Sampler<'a> {
    curve: &'a dyn Curve,
    offset: Option<&'a PiecewiseLinearOffset>,
}

impl Sampler<'_> {
    fn point(&self, fraction: f64) -> Point2 {
        match self.offset {
            Some(offset) => self.curve.offset_point(fraction, offset),
            None => self.curve.point(fraction),
        }
    }

    fn direction(&self, fraction: f64) -> f64 {
        match self.offset {
            Some(offset) => self.curve.offset_direction(fraction, offset),
            None => self.curve.direction(fraction),
        }
    }
}

/// Flattens `curve` by recursive midpoint insertion under `limits`.
pub(super) fn flatten(
    curve: &dyn Curve,
    offset: Option<&PiecewiseLinearOffset>,
    limits: &Limits,
) -> Result<Vec<Point2>> {
    let sampler = Sampler { curve, offset };
    let fractions = seed_fractions(curve, offset);

    let mut points = vec![sampler.point(fractions[0])];
    for pair in fractions.windows(2) {
        let p0 = points[points.len() - 1];
        let p1 = sampler.point(pair[1]);
        refine(&sampler, pair[0], p0, pair[1], p1, limits, &mut points, 0)?;
    }
    Ok(points)
}

/// Examines the interval `[f0, f1]` whose start point is already emitted;
/// emits the midpoint (recursively) when any stopping criterion rejects
/// the chord, then emits `p1`.
#[allow(clippy::too_many_arguments)]
fn refine(
    sampler: &Sampler,
    f0: f64,
    p0: Point2,
    f1: f64,
    p1: Point2,
    limits: &Limits,
    out: &mut Vec<Point2>,
    depth: usize,
) -> Result<()> {
    if f1 - f0 < MIN_INTERVAL {
        out.push(p1);
        return Ok(());
    }

    let fm = 0.5 * (f0 + f1);
    let pm = sampler.point(fm);
    let chord = p1 - p0;
    let chord_len = chord.norm();
    let mut split = false;

    if let Some(deviation) = limits.deviation {
        if point_to_segment_dist(&pm, &p0, &p1) > deviation {
            split = true;
        }
        // A symmetric S-bend can leave the midpoint on the chord; the
        // quarter-point winding test catches it once the chord is long
        // enough to matter.
        if !split && chord_len > deviation && has_inflection(sampler, f0, f1, &p0, &chord) {
            split = true;
        }
    }

    let nudge = DIRECTION_NUDGE * (f1 - f0);

    if !split && limits.loopback {
        let turn = angle_diff(
            sampler.direction(f0 + nudge),
            sampler.direction(f1 - nudge),
        );
        if turn.abs() > FRAC_PI_2 {
            split = true;
        }
    }

    if let Some(angle) = limits.angle {
        if !split {
            if chord_len > TOLERANCE {
                let chord_angle = chord.y.atan2(chord.x);
                if angle_diff(chord_angle, sampler.direction(f0 + nudge)).abs() > angle
                    || angle_diff(chord_angle, sampler.direction(f1 - nudge)).abs() > angle
                {
                    split = true;
                }
            } else {
                // A collapsed chord has no usable chord angle, but the
                // interval is still unresolved while its endpoint
                // directions disagree; keep splitting so the safety valve
                // can fire instead of silently accepting the corner.
                let turn = angle_diff(
                    sampler.direction(f0 + nudge),
                    sampler.direction(f1 - nudge),
                );
                if turn.abs() > angle {
                    split = true;
                }
            }
        }
        if !split && has_inflection(sampler, f0, f1, &p0, &chord) {
            split = true;
        }
        if split && depth >= MAX_CONSECUTIVE_INSERTIONS {
            return Err(TessellationError::KinkValve {
                fraction: fm,
                insertions: depth,
            }
            .into());
        }
    }

    if split {
        refine(sampler, f0, p0, fm, pm, limits, out, depth + 1)?;
        refine(sampler, fm, pm, f1, p1, limits, out, depth + 1)
    } else {
        out.push(p1);
        Ok(())
    }
}

/// Quarter/three-quarter winding test: opposite signs mean the curve
/// crosses its chord inside the interval.
fn has_inflection(sampler: &Sampler, f0: f64, f1: f64, p0: &Point2, chord: &crate::math::Vector2) -> bool {
    let span = f1 - f0;
    let q = sampler.point(f0 + 0.25 * span);
    let r = sampler.point(f0 + 0.75 * span);
    let wq = cross_2d(chord, &(q - p0));
    let wr = cross_2d(chord, &(r - p0));
    wq.abs() > TOLERANCE && wr.abs() > TOLERANCE && wq.signum() != wr.signum()
}
