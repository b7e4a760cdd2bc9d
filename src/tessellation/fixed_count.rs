use crate::geometry::curve::Curve;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::Point2;

use super::seed_fractions;

/// Uniform sampling at `segments` equal fraction steps.
///
/// Kink fractions and mapped offset knots are merged into the uniform
/// grid so they appear in the output exactly.
pub(super) fn flatten(
    curve: &dyn Curve,
    offset: Option<&PiecewiseLinearOffset>,
    segments: usize,
) -> Vec<Point2> {
    let mut fractions = seed_fractions(curve, offset);
    #[allow(clippy::cast_precision_loss)]
    let n = segments as f64;
    for i in 1..segments {
        #[allow(clippy::cast_precision_loss)]
        fractions.push(i as f64 / n);
    }
    fractions.sort_by(f64::total_cmp);
    fractions.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    fractions
        .into_iter()
        .map(|f| match offset {
            Some(offset) => curve.offset_point(f, offset),
            None => curve.point(f),
        })
        .collect()
}
