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
    let cross = d1.perp(d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let delta = p2 - p1;
    let t = delta.perp(d2) / cross;
    let u = delta.perp(d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel and collinear segments never intersect.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of the infinite line `origin + s * direction` with segment `b0 → b1`.
///
/// Returns `(point, s)` when the line meets the segment.
#[must_use]
pub fn line_segment_intersect_2d(
    origin: &Point2,
    direction: &Vector2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64)> {
    let db = b1 - b0;
    let (s, u) = line_line_intersect_2d(origin, direction, b0, &db)?;
    if (-TOLERANCE..=1.0 + TOLERANCE).contains(&u) {
        Some((origin + direction * s, s))
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn perpendicular_segments_cross() {
        let (pt, t, u) =
            segment_segment_intersect_2d(&p(0.0, 0.0), &p(10.0, 0.0), &p(4.0, -5.0), &p(4.0, 5.0))
                .unwrap();
        assert_abs_diff_eq!(pt.x, 4.0);
        assert_abs_diff_eq!(pt.y, 0.0);
        assert_abs_diff_eq!(t, 0.4);
        assert_abs_diff_eq!(u, 0.5);
    }

    #[test]
    fn disjoint_segments_do_not_cross() {
        let r =
            segment_segment_intersect_2d(&p(0.0, 0.0), &p(10.0, 0.0), &p(14.0, -5.0), &p(14.0, 5.0));
        assert!(r.is_none());
    }

    #[test]
    fn parallel_segments_do_not_cross() {
        let r = segment_segment_intersect_2d(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 1.0), &p(10.0, 1.0));
        assert!(r.is_none());
    }

    #[test]
    fn line_hits_segment_outside_its_own_span() {
        let (pt, s) = line_segment_intersect_2d(
            &p(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &p(-20.0, -1.0),
            &p(-20.0, 1.0),
        )
        .unwrap();
        assert_abs_diff_eq!(pt.x, -20.0);
        assert_abs_diff_eq!(s, -20.0);
    }
}
