use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point2, dir: &Vector2, t: f64) -> Point2 {
    Point2::new(origin.x + dir.x * t, origin.y + dir.y * t)
}

/// Projects `p` onto the segment `a..b`, returning the closest point and
/// the clamped parameter `t` in `[0, 1]`.
#[must_use]
pub fn project_onto_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return (*a, 0.0);
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (a + d * t, t)
}

/// Returns the minimum distance from `p` to the segment `a..b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (closest, _) = project_onto_segment(p, a, b);
    (p - closest).norm()
}

/// Returns the perpendicular distance from `p` to the infinite line
/// through `origin` with direction `dir` (need not be normalized).
#[must_use]
pub fn point_to_line_dist(p: &Point2, origin: &Point2, dir: &Vector2) -> f64 {
    let len = dir.norm();
    if len < TOLERANCE {
        return (p - origin).norm();
    }
    let v = p - origin;
    (dir.x * v.y - dir.y * v.x).abs() / len
}
