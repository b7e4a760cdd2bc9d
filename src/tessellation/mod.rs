mod adaptive;
mod fixed_count;

use crate::error::{Result, TessellationError};
use crate::geometry::curve::Curve;
use crate::geometry::offset::PiecewiseLinearOffset;
use crate::math::{Point2, Point3};

use adaptive::Limits;

/// A polyline approximation of a 2D curve.
///
/// Ordered, immutable sequence of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point2>,
}

impl Polyline {
    /// Creates a polyline from an ordered point sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are given.
    pub fn new(points: Vec<Point2>) -> Result<Self> {
        if points.len() < 2 {
            return Err(TessellationError::TooFewPoints(points.len()).into());
        }
        Ok(Self { points })
    }

    /// Returns the ordered points.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a polyline holds at least 2 points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the total chord length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).norm())
            .sum()
    }
}

/// A polyline approximation of a 3D curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline3 {
    points: Vec<Point3>,
}

impl Polyline3 {
    /// Creates a polyline from an ordered point sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are given.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(TessellationError::TooFewPoints(points.len()).into());
        }
        Ok(Self { points })
    }

    /// Returns the ordered points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a polyline holds at least 2 points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Flattening strategy configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FlattenerKind {
    /// Uniform sampling at a fixed number of segments.
    NumSegments(usize),
    /// Recursive insertion bounded by chord deviation.
    MaxDeviation(f64),
    /// Deviation bound plus a chord-vs-tangent angle bound.
    MaxDeviationAngle { deviation: f64, angle: f64 },
    /// Chord-vs-tangent angle bound only.
    MaxAngle(f64),
}

/// Converts curves into polylines under a chosen stopping criterion.
///
/// Stateless and reusable across curves. Every produced polyline contains
/// the curve's start and end points and every declared kink fraction
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flattener {
    kind: FlattenerKind,
}

impl Flattener {
    /// Uniform sampling at `segments` equal fraction steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero.
    pub fn num_segments(segments: usize) -> Result<Self> {
        if segments == 0 {
            return Err(TessellationError::InvalidParameters(
                "segment count must be at least 1".to_owned(),
            )
            .into());
        }
        Ok(Self {
            kind: FlattenerKind::NumSegments(segments),
        })
    }

    /// Adaptive refinement until no point deviates from its chord by more
    /// than `deviation`.
    ///
    /// # Errors
    ///
    /// Returns an error if `deviation` is not positive and finite.
    pub fn max_deviation(deviation: f64) -> Result<Self> {
        if !deviation.is_finite() || deviation <= 0.0 {
            return Err(TessellationError::InvalidParameters(
                "max deviation must be positive".to_owned(),
            )
            .into());
        }
        Ok(Self {
            kind: FlattenerKind::MaxDeviation(deviation),
        })
    }

    /// Adaptive refinement under both a deviation and an angle bound.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not positive and finite.
    pub fn max_deviation_angle(deviation: f64, angle: f64) -> Result<Self> {
        if !deviation.is_finite() || deviation <= 0.0 {
            return Err(TessellationError::InvalidParameters(
                "max deviation must be positive".to_owned(),
            )
            .into());
        }
        if !angle.is_finite() || angle <= 0.0 {
            return Err(TessellationError::InvalidParameters(
                "max angle must be positive".to_owned(),
            )
            .into());
        }
        Ok(Self {
            kind: FlattenerKind::MaxDeviationAngle { deviation, angle },
        })
    }

    /// Adaptive refinement under an angle bound only.
    ///
    /// # Errors
    ///
    /// Returns an error if `angle` is not positive and finite.
    pub fn max_angle(angle: f64) -> Result<Self> {
        if !angle.is_finite() || angle <= 0.0 {
            return Err(TessellationError::InvalidParameters(
                "max angle must be positive".to_owned(),
            )
            .into());
        }
        Ok(Self {
            kind: FlattenerKind::MaxAngle(angle),
        })
    }

    /// Flattens a curve into a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if an angle-bounded strategy stalls around an
    /// undeclared kink (safety valve).
    pub fn flatten(&self, curve: &dyn Curve) -> Result<Polyline> {
        self.run(curve, None)
    }

    /// Flattens the laterally offset curve into a polyline.
    ///
    /// Knots of the offset function are translated from offset-domain
    /// (arc-length) fractions into curve-parameter fractions and appear in
    /// the output exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if an angle-bounded strategy stalls around an
    /// undeclared kink (safety valve).
    pub fn flatten_offset(
        &self,
        curve: &dyn Curve,
        offset: &PiecewiseLinearOffset,
    ) -> Result<Polyline> {
        self.run(curve, Some(offset))
    }

    fn run(&self, curve: &dyn Curve, offset: Option<&PiecewiseLinearOffset>) -> Result<Polyline> {
        let points = match self.kind {
            FlattenerKind::NumSegments(n) => fixed_count::flatten(curve, offset, n),
            FlattenerKind::MaxDeviation(deviation) => adaptive::flatten(
                curve,
                offset,
                &Limits {
                    deviation: Some(deviation),
                    angle: None,
                    // The loop-back heuristic only applies without an offset.
                    loopback: offset.is_none(),
                },
            )?,
            FlattenerKind::MaxDeviationAngle { deviation, angle } => adaptive::flatten(
                curve,
                offset,
                &Limits {
                    deviation: Some(deviation),
                    angle: Some(angle),
                    loopback: false,
                },
            )?,
            FlattenerKind::MaxAngle(angle) => adaptive::flatten(
                curve,
                offset,
                &Limits {
                    deviation: None,
                    angle: Some(angle),
                    loopback: false,
                },
            )?,
        };
        Polyline::new(points)
    }
}

/// Collects the seed fractions every strategy must hit exactly: the curve
/// ends, the curve's own kinks, and (for offset flattening) the offset
/// knots mapped into curve-parameter fractions.
fn seed_fractions(curve: &dyn Curve, offset: Option<&PiecewiseLinearOffset>) -> Vec<f64> {
    let mut fractions = vec![0.0, 1.0];
    fractions.extend(curve.kinks().into_iter().filter(|f| *f > 0.0 && *f < 1.0));
    if let Some(offset) = offset {
        fractions.extend(
            offset
                .knots()
                .filter(|k| *k > 0.0 && *k < 1.0)
                .map(|k| curve.parameter_at(k)),
        );
    }
    fractions.sort_by(f64::total_cmp);
    fractions.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    fractions
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoadGeomError;
    use crate::geometry::curve::{Arc, CubicBezier, Curve, Straight, Turn};
    use crate::geometry::directed::DirectedPoint2;
    use crate::math::intersect_2d::point_to_segment_dist;
    use std::f64::consts::FRAC_PI_2;

    /// Corner fraction of [`Elbow`]; deliberately not representable by
    /// binary midpoint splitting, so refinement can never land on it.
    const CORNER: f64 = 1.0 / 3.0;

    /// Two perpendicular legs meeting at [`CORNER`]. Whether the corner is
    /// declared as a kink is up to the test.
    struct Elbow {
        declare_kink: bool,
    }

    impl Curve for Elbow {
        fn length(&self) -> f64 {
            2.0
        }

        fn point(&self, fraction: f64) -> Point2 {
            if fraction < CORNER {
                Point2::new(fraction / CORNER, 0.0)
            } else {
                Point2::new(1.0, (fraction - CORNER) / (1.0 - CORNER))
            }
        }

        fn direction(&self, fraction: f64) -> f64 {
            if fraction < CORNER {
                0.0
            } else {
                FRAC_PI_2
            }
        }

        fn start_curvature(&self) -> f64 {
            0.0
        }

        fn end_curvature(&self) -> f64 {
            0.0
        }

        fn kinks(&self) -> Vec<f64> {
            if self.declare_kink {
                vec![CORNER]
            } else {
                Vec::new()
            }
        }
    }

    fn quarter_arc() -> Arc {
        Arc::new(
            DirectedPoint2::new(Point2::origin(), 0.0),
            10.0,
            Turn::Left,
            FRAC_PI_2,
        )
        .unwrap()
    }

    #[test]
    fn polyline_needs_two_points() {
        assert!(Polyline::new(vec![Point2::origin()]).is_err());
        assert!(Polyline::new(vec![Point2::origin(), Point2::new(1.0, 0.0)]).is_ok());
    }

    #[test]
    fn polyline_length_sums_chords() {
        let p = Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 4.0),
        ])
        .unwrap();
        assert!((p.length() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn flattener_rejects_invalid_parameters() {
        assert!(Flattener::num_segments(0).is_err());
        assert!(Flattener::max_deviation(0.0).is_err());
        assert!(Flattener::max_deviation(-1.0).is_err());
        assert!(Flattener::max_deviation_angle(0.1, 0.0).is_err());
        assert!(Flattener::max_angle(f64::NAN).is_err());
    }

    #[test]
    fn max_deviation_bounds_chord_sagitta() {
        let arc = quarter_arc();
        let bound = 0.01;
        let polyline = Flattener::max_deviation(bound)
            .unwrap()
            .flatten(&arc)
            .unwrap();
        assert!((polyline.points()[0] - arc.start_point()).norm() < 1e-12);
        assert!((polyline.points()[polyline.len() - 1] - arc.end_point()).norm() < 1e-9);
        // All points lie on the circle, so each chord's worst deviation is
        // its exact sagitta r - sqrt(r^2 - (c/2)^2).
        for pair in polyline.points().windows(2) {
            let half_chord = 0.5 * (pair[1] - pair[0]).norm();
            let sagitta = 10.0 - (100.0 - half_chord * half_chord).sqrt();
            assert!(sagitta <= bound + 1e-9, "sagitta {sagitta} over bound");
        }
    }

    #[test]
    fn max_angle_bounds_chord_tangent_angle() {
        let arc = quarter_arc();
        let bound = 5.0_f64.to_radians();
        let polyline = Flattener::max_angle(bound).unwrap().flatten(&arc).unwrap();
        // On a circle the chord-to-tangent angle is asin(c / (2 r)).
        for pair in polyline.points().windows(2) {
            let half_chord = 0.5 * (pair[1] - pair[0]).norm();
            assert!((half_chord / 10.0).asin() <= bound + 1e-9);
        }
    }

    #[test]
    fn undeclared_kink_trips_the_safety_valve() {
        let result = Flattener::max_angle(0.01)
            .unwrap()
            .flatten(&Elbow {
                declare_kink: false,
            });
        match result {
            Err(RoadGeomError::Tessellation(TessellationError::KinkValve {
                fraction,
                insertions,
            })) => {
                // Refinement piles up around the corner before giving up,
                // even after the chords there have collapsed to nothing.
                assert!((fraction - CORNER).abs() < 1e-9);
                assert!(insertions >= 50);
            }
            other => panic!("expected the safety valve, got {other:?}"),
        }
    }

    #[test]
    fn declared_kink_is_hit_exactly() {
        let polyline = Flattener::max_angle(0.01)
            .unwrap()
            .flatten(&Elbow { declare_kink: true })
            .unwrap();
        assert!(polyline
            .points()
            .iter()
            .any(|p| (p - Point2::new(1.0, 0.0)).norm() < 1e-9));
    }

    #[test]
    fn offset_knots_appear_exactly() {
        let straight =
            Straight::new(DirectedPoint2::new(Point2::origin(), 0.0), 10.0).unwrap();
        let offset =
            PiecewiseLinearOffset::new(vec![(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]).unwrap();
        let polyline = Flattener::max_deviation(0.1)
            .unwrap()
            .flatten_offset(&straight, &offset)
            .unwrap();
        // The offset polyline is exactly piecewise linear between knots, so
        // the three seeded fractions are all that is needed.
        assert_eq!(polyline.len(), 3);
        assert!((polyline.points()[0] - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((polyline.points()[1] - Point2::new(5.0, 1.0)).norm() < 1e-9);
        assert!((polyline.points()[2] - Point2::new(10.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn max_deviation_holds_on_a_resampled_bezier() {
        let b = CubicBezier::new([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(3.0, 2.0),
            Point2::new(4.0, 0.0),
        ])
        .unwrap();
        let bound = 0.01;
        let polyline = Flattener::max_deviation(bound)
            .unwrap()
            .flatten(&b)
            .unwrap();
        // Dense resampling: every curve point must sit within the bound of
        // the polyline. The criterion samples each chord at its parameter
        // midpoint, which on short pieces is within a few percent of the
        // true maximum, hence the slack.
        for i in 0..=500 {
            let p = b.point(f64::from(i) / 500.0);
            let nearest = polyline
                .points()
                .windows(2)
                .map(|pair| point_to_segment_dist(&p, &pair[0], &pair[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(
                nearest <= bound * 1.1,
                "curve point strays {nearest} from the polyline"
            );
        }
    }

    #[test]
    fn loopback_heuristic_splits_wide_sweeps() {
        // 108-degree sweep: its sagitta of about 4.1 passes a deviation
        // bound of 20, so only the endpoint-direction check forces a split.
        let arc = Arc::new(
            DirectedPoint2::new(Point2::origin(), 0.0),
            10.0,
            Turn::Left,
            0.6 * std::f64::consts::PI,
        )
        .unwrap();
        let polyline = Flattener::max_deviation(20.0)
            .unwrap()
            .flatten(&arc)
            .unwrap();
        // A lax deviation bound alone would accept a single chord.
        assert!(polyline.len() > 2);
    }
}
