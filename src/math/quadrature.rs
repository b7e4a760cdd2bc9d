//! Fixed-node numerical integration and small combinatorial helpers.

/// Abscissae and weights of 24-point Legendre-Gauss quadrature on `[-1, 1]`.
///
/// Each entry is `(abscissa, weight)`. The nodes are symmetric around zero.
const LEGENDRE_GAUSS_24: [(f64, f64); 24] = [
    (-0.064_056_892_862_605_6, 0.127_938_195_346_752_2),
    (0.064_056_892_862_605_6, 0.127_938_195_346_752_2),
    (-0.191_118_867_473_616_3, 0.125_837_456_346_828_3),
    (0.191_118_867_473_616_3, 0.125_837_456_346_828_3),
    (-0.315_042_679_696_163_4, 0.121_670_472_927_803_4),
    (0.315_042_679_696_163_4, 0.121_670_472_927_803_4),
    (-0.433_793_507_626_045_1, 0.115_505_668_053_725_6),
    (0.433_793_507_626_045_1, 0.115_505_668_053_725_6),
    (-0.545_421_471_388_839_6, 0.107_444_270_115_965_6),
    (0.545_421_471_388_839_6, 0.107_444_270_115_965_6),
    (-0.648_093_651_936_975_5, 0.097_618_652_104_113_9),
    (0.648_093_651_936_975_5, 0.097_618_652_104_113_9),
    (-0.740_124_191_578_554_4, 0.086_190_161_531_953_3),
    (0.740_124_191_578_554_4, 0.086_190_161_531_953_3),
    (-0.820_001_985_973_902_9, 0.073_346_481_411_080_3),
    (0.820_001_985_973_902_9, 0.073_346_481_411_080_3),
    (-0.886_415_527_004_401_1, 0.059_298_584_915_436_8),
    (0.886_415_527_004_401_1, 0.059_298_584_915_436_8),
    (-0.938_274_552_002_732_8, 0.044_277_438_817_419_8),
    (0.938_274_552_002_732_8, 0.044_277_438_817_419_8),
    (-0.974_728_555_971_309_5, 0.028_531_388_628_933_7),
    (0.974_728_555_971_309_5, 0.028_531_388_628_933_7),
    (-0.995_187_219_997_021_3, 0.012_341_229_799_987_2),
    (0.995_187_219_997_021_3, 0.012_341_229_799_987_2),
];

/// Integrates `f` over `[a, b]` with fixed 24-point Legendre-Gauss quadrature.
///
/// Exact for polynomials up to degree 47; used for Bézier arc-length
/// estimation and Fresnel-integral panels, where the integrand is smooth.
pub fn legendre_gauss_24(mut f: impl FnMut(f64) -> f64, a: f64, b: f64) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    let sum: f64 = LEGENDRE_GAUSS_24
        .iter()
        .map(|&(x, w)| w * f(mid + half * x))
        .sum();
    sum * half
}

/// `n!` for small `n`. Overflows `u64` for `n > 20`.
#[must_use]
pub fn factorial(n: u64) -> u64 {
    (1..=n).product()
}

/// Binomial coefficient `n` choose `k`.
///
/// Uses the multiplicative form, which stays exact in integer arithmetic
/// at every step.
#[must_use]
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn integrates_polynomial_exactly() {
        let result = legendre_gauss_24(|x| x * x, 0.0, 3.0);
        assert!((result - 9.0).abs() < 1e-12);
    }

    #[test]
    fn integrates_cosine() {
        let result = legendre_gauss_24(f64::cos, 0.0, FRAC_PI_2);
        assert!((result - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_sum_to_interval_length() {
        let result = legendre_gauss_24(|_| 1.0, -1.0, 1.0);
        assert!((result - 2.0).abs() < 1e-12);
    }

    #[test]
    fn factorial_values() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(1), 1);
        assert_eq!(factorial(5), 120);
        assert_eq!(factorial(12), 479_001_600);
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(3, 0), 1);
        assert_eq!(binomial(3, 1), 3);
        assert_eq!(binomial(3, 2), 3);
        assert_eq!(binomial(3, 3), 1);
        assert_eq!(binomial(10, 5), 252);
        assert_eq!(binomial(2, 5), 0);
    }
}
