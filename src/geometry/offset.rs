use crate::error::{OffsetError, Result};
use crate::math::TOLERANCE;

/// A piecewise-linear lateral offset over the fraction domain `[0, 1]`.
///
/// Stores an ordered set of `(fraction, value)` pairs. Lookups between
/// knots interpolate linearly; lookups outside the knot span are clamped
/// to the first/last value. Positive values displace a curve to the left
/// of its direction of travel.
///
/// Equality compares the knot sets exactly, which curve-side caches use
/// to detect a stale offset function.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearOffset {
    /// Sorted by fraction, fractions unique, everything finite.
    entries: Vec<(f64, f64)>,
}

impl PiecewiseLinearOffset {
    /// Creates an offset function from `(fraction, value)` pairs.
    ///
    /// The pairs need not be sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if no pairs are given, a fraction is non-finite or
    /// outside `[0, 1]`, a value is non-finite, or two fractions coincide.
    pub fn new(mut entries: Vec<(f64, f64)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(OffsetError::Empty.into());
        }
        for &(fraction, value) in &entries {
            if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
                return Err(OffsetError::FractionOutOfRange(fraction).into());
            }
            if !value.is_finite() {
                return Err(OffsetError::NonFiniteValue { fraction, value }.into());
            }
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in entries.windows(2) {
            if pair[1].0 - pair[0].0 < TOLERANCE {
                return Err(OffsetError::DuplicateFraction(pair[1].0).into());
            }
        }
        Ok(Self { entries })
    }

    /// Creates a constant offset function.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not finite.
    pub fn constant(value: f64) -> Result<Self> {
        Self::new(vec![(0.0, value)])
    }

    /// The constant-zero offset function.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            entries: vec![(0.0, 0.0)],
        }
    }

    /// Returns the offset value at `fraction`.
    ///
    /// Exact at a knot, linearly interpolated between knots, clamped to
    /// the first/last value outside the knot span.
    #[must_use]
    pub fn value(&self, fraction: f64) -> f64 {
        let first = self.entries[0];
        if fraction <= first.0 {
            return first.1;
        }
        let last = self.entries[self.entries.len() - 1];
        if fraction >= last.0 {
            return last.1;
        }
        // Invariant: first.0 < fraction < last.0, so a surrounding pair exists.
        for pair in self.entries.windows(2) {
            let (f0, v0) = pair[0];
            let (f1, v1) = pair[1];
            if fraction < f1 {
                let t = (fraction - f0) / (f1 - f0);
                return v0 + (v1 - v0) * t;
            }
        }
        last.1
    }

    /// Returns the piecewise-constant derivative `d(value)/d(fraction)`.
    ///
    /// Zero outside the knot span (clamped extrapolation). At an interior
    /// knot the slope of the interval to the right applies; at the last
    /// knot, the slope of the interval to its left.
    #[must_use]
    pub fn derivative(&self, fraction: f64) -> f64 {
        if self.entries.len() < 2 {
            return 0.0;
        }
        let first = self.entries[0].0;
        let last = self.entries[self.entries.len() - 1].0;
        if fraction < first || fraction > last {
            return 0.0;
        }
        for pair in self.entries.windows(2) {
            let (f0, v0) = pair[0];
            let (f1, v1) = pair[1];
            if fraction < f1 || (f1 - last).abs() < TOLERANCE {
                return (v1 - v0) / (f1 - f0);
            }
        }
        0.0
    }

    /// Returns the knot fractions in ascending order.
    pub fn knots(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(fraction, _)| fraction)
    }

    /// Returns `true` if every knot value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|&(_, value)| value.abs() < TOLERANCE)
    }
}
