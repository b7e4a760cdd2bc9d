pub mod fresnel;
pub mod intersect_2d;
pub mod quadrature;

use std::f64::consts::{PI, TAU};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Angular tolerance of 1/100 degree, in radians.
///
/// Directions closer than this are treated as equal: clothoid construction
/// degenerates to a straight or an arc, Bézier offsetting skips curvature
/// splitting for numerically straight curves.
pub const ANGLE_TOLERANCE: f64 = PI / 18_000.0;

/// Normalizes an angle into `[-pi, pi)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Smallest signed difference `b - a` between two headings, in `[-pi, pi)`.
#[must_use]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}

/// Unit vector pointing along a heading angle.
#[must_use]
pub fn unit_vector(heading: f64) -> Vector2 {
    Vector2::new(heading.cos(), heading.sin())
}

/// Left-hand perpendicular of a vector (rotation by +90 degrees).
#[must_use]
pub fn perpendicular(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Rotates a vector by `angle` radians counterclockwise.
#[must_use]
pub fn rotate(v: &Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// 2D cross product (z-component of the 3D cross product).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
