//! Segmentation of a cubic Bézier for lateral offsetting.
//!
//! A uniform lateral offset of a Bézier is not itself a Bézier, so the
//! curve is split into curvature-monotonic, sign-consistent pieces (at
//! derivative roots, inflections, and offset-function knots) and one
//! approximating offset sub-Bézier is built per piece.

use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::{
    angle_diff, cross_2d, perpendicular, rotate, Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE,
};

use super::cubic_bezier::CubicBezier;
use super::Curve;

/// Breakpoints closer than this (in parameter space) are merged, and
/// breakpoints this close to 0 or 1 are dropped.
const BREAK_TOLERANCE: f64 = 1e-6;

/// Reject tangent-ray intersections further out than this multiple of the
/// piece chord; such pieces are effectively straight and are translated
/// instead.
const INTERSECTION_RANGE: f64 = 50.0;

/// One offset sub-Bézier covering the parameter range `[start, end]` of
/// the source curve.
#[derive(Debug, Clone)]
pub(super) struct OffsetSegment {
    pub start: f64,
    pub end: f64,
    pub curve: CubicBezier,
}

/// Finds the segment owning `fraction` and the local parameter within it.
pub(super) fn locate(segments: &[OffsetSegment], fraction: f64) -> (&OffsetSegment, f64) {
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if fraction <= segment.end || i == last {
            let span = segment.end - segment.start;
            let local = if span > TOLERANCE {
                ((fraction - segment.start) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            return (segment, local);
        }
    }
    // Unreachable: the loop always returns on the last segment.
    (&segments[last], 1.0)
}

/// Builds the ordered offset segment map for one offset function.
pub(super) fn build_segments(
    curve: &CubicBezier,
    offset: &PiecewiseLinearOffset,
) -> Vec<OffsetSegment> {
    let mut breaks: Vec<f64> = Vec::new();
    if !is_numerically_straight(curve) {
        breaks.extend(derivative_roots(curve));
        breaks.extend(inflections(curve));
    }
    // Offset knots live in the arc-length domain; map them to parameters.
    breaks.extend(
        offset
            .knots()
            .filter(|k| *k > 0.0 && *k < 1.0)
            .map(|k| curve.parameter_at(k)),
    );
    breaks.retain(|t| *t > BREAK_TOLERANCE && *t < 1.0 - BREAK_TOLERANCE);
    breaks.sort_by(f64::total_cmp);
    breaks.dedup_by(|a, b| (*a - *b).abs() < BREAK_TOLERANCE);

    let total_length = curve.length();
    let mut segments = Vec::with_capacity(breaks.len() + 1);
    let mut remaining = curve.clone();
    let mut consumed_length = 0.0;
    let mut prev_fraction = 0.0;
    let mut prev_offset = offset.value(0.0);

    for t in breaks {
        let local = (t - prev_fraction) / (1.0 - prev_fraction);
        let (head, tail) = remaining.split(local);
        consumed_length += head.length();
        let length_fraction = if total_length > TOLERANCE {
            consumed_length / total_length
        } else {
            t
        };
        let next_offset = offset.value(length_fraction);
        segments.push(OffsetSegment {
            start: prev_fraction,
            end: t,
            curve: offset_piece(&head, prev_offset, next_offset),
        });
        remaining = tail;
        prev_fraction = t;
        prev_offset = next_offset;
    }
    segments.push(OffsetSegment {
        start: prev_fraction,
        end: 1.0,
        curve: offset_piece(&remaining, prev_offset, offset.value(1.0)),
    });
    segments
}

/// A curve whose control-polygon legs all point within the angular
/// tolerance of one another needs no curvature splitting.
fn is_numerically_straight(curve: &CubicBezier) -> bool {
    let points = curve.control_points();
    let mut reference: Option<f64> = None;
    for pair in points.windows(2) {
        let leg = pair[1] - pair[0];
        if leg.norm() < TOLERANCE {
            continue;
        }
        let angle = leg.y.atan2(leg.x);
        match reference {
            None => reference = Some(angle),
            Some(first) => {
                if angle_diff(first, angle).abs() > ANGLE_TOLERANCE {
                    return false;
                }
            }
        }
    }
    true
}

/// Parameters in `(0, 1)` where either coordinate of the derivative is
/// zero, via the quadratic formula on the derivative's coefficients.
fn derivative_roots(curve: &CubicBezier) -> Vec<f64> {
    let [d0, d1, d2] = *curve.derivative_points();
    // B'(t) = (1-t)^2 d0 + 2(1-t)t d1 + t^2 d2, expanded per coordinate.
    let a = d0 - d1 * 2.0 + d2;
    let b = (d1 - d0) * 2.0;
    let c = d0;
    let mut roots = quadratic_roots(a.x, b.x, c.x);
    roots.extend(quadratic_roots(a.y, b.y, c.y));
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// Parameters in `(0, 1)` where the signed curvature changes sign.
///
/// The control points are translated and rotated so the chord lies on the
/// x-axis, then `x'y'' - y'x'' = 0` reduces to a quadratic (or linear)
/// equation in `t`.
fn inflections(curve: &CubicBezier) -> Vec<f64> {
    let points = curve.control_points();
    let chord = points[3] - points[0];
    if chord.norm() < TOLERANCE {
        return Vec::new();
    }
    let angle = chord.y.atan2(chord.x);
    let aligned: Vec<Vector2> = points
        .iter()
        .map(|p| rotate(&(p - points[0]), -angle))
        .collect();

    let a_vec = aligned[1];
    let b_vec = aligned[2] - aligned[1] * 2.0;
    let c_vec = aligned[3] - aligned[2] * 3.0 + aligned[1] * 3.0;
    let a = cross_2d(&b_vec, &c_vec);
    let b = cross_2d(&a_vec, &c_vec);
    let c = cross_2d(&a_vec, &b_vec);

    let mut roots = quadratic_roots(a, b, c);
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// Real roots of `a t^2 + b t + c = 0`, degrading to the linear case.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < TOLERANCE {
        if b.abs() < TOLERANCE {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant < TOLERANCE {
        return vec![-b / (2.0 * a)];
    }
    // Citardauq form keeps the smaller root numerically stable.
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let mut roots = vec![q / a];
    if q.abs() > TOLERANCE {
        roots.push(c / q);
    }
    roots
}

/// Builds the offset sub-Bézier for one curvature-monotonic piece.
///
/// Endpoints move perpendicular to their tangents by the local offset.
/// For an arc-like piece the interior control points come from
/// intersecting the corrected tangent rays with the offset middle leg;
/// a sloped offset tilts the end tangents by
/// `atan((offset_end - offset_start) / piece_length)`. Pieces whose end
/// tangents are parallel (straight or S-shaped across an inflection) are
/// translated leg by leg instead.
fn offset_piece(piece: &CubicBezier, offset_start: f64, offset_end: f64) -> CubicBezier {
    let [p0, p1, p2, p3] = *piece.control_points();
    let d0 = leg_direction(&[p0, p1, p2, p3]);
    let d3 = leg_direction(&[p3, p2, p1, p0]) * -1.0;
    let q0 = p0 + perpendicular(&d0) * offset_start;
    let q3 = p3 + perpendicular(&d3) * offset_end;

    let piece_length = piece.length();
    let slope = if piece_length > TOLERANCE {
        ((offset_end - offset_start) / piece_length).atan()
    } else {
        0.0
    };
    let e0 = rotate(&d0, slope);
    let e3 = rotate(&d3, slope);

    let chord = (p3 - p0).norm();
    let mid_leg = p2 - p1;

    if cross_2d(&e0, &e3).abs() > ANGLE_TOLERANCE && mid_leg.norm() > TOLERANCE {
        // Arc-like piece: rebuild the interior points from the corrected
        // tangent rays against the offset middle leg.
        let mid_normal = perpendicular(&mid_leg.normalize());
        let mid_point = p1 + mid_normal * (0.5 * (offset_start + offset_end));
        let from_start = line_line_intersect_2d(&q0, &e0, &mid_point, &mid_leg);
        let from_end = line_line_intersect_2d(&q3, &e3, &mid_point, &mid_leg);
        if let (Some((t1, _)), Some((t2, _))) = (from_start, from_end) {
            if t1.abs() < INTERSECTION_RANGE * chord && t2.abs() < INTERSECTION_RANGE * chord {
                return CubicBezier::from_points_unchecked([
                    q0,
                    q0 + e0 * t1,
                    q3 + e3 * t2,
                    q3,
                ]);
            }
        }
    }

    if mid_leg.norm() < TOLERANCE {
        // Collapsed middle leg: keep the original leg lengths along the
        // corrected tangents.
        return CubicBezier::from_points_unchecked([
            q0,
            q0 + e0 * (p1 - p0).norm(),
            q3 - e3 * (p3 - p2).norm(),
            q3,
        ]);
    }

    // Parallel tangents: translate the interior points by the
    // interpolated offset along the start normal.
    let n = perpendicular(&d0);
    let third = (offset_end - offset_start) / 3.0;
    CubicBezier::from_points_unchecked([
        q0,
        p1 + n * (offset_start + third),
        p2 + n * (offset_start + 2.0 * third),
        q3,
    ])
}

/// First non-degenerate leg direction from the given anchor ordering.
fn leg_direction(points: &[Point2; 4]) -> Vector2 {
    for p in &points[1..] {
        let leg = p - points[0];
        if leg.norm() > TOLERANCE {
            return leg / leg.norm();
        }
    }
    Vector2::new(1.0, 0.0)
}
