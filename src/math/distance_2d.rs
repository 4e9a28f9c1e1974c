use super::{Point2, TOLERANCE};

/// Closest point on a segment to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// The closest point on the segment.
    pub point: Point2,
    /// Segment parameter of `point` in `[0, 1]`.
    pub t: f64,
    /// Distance from the query point to `point`.
    pub distance: f64,
}

/// Returns the closest point on segment `a → b` to `p`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> SegmentProjection {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return SegmentProjection {
            point: *a,
            t: 0.0,
            distance: (p - a).norm(),
        };
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let point = a + d * t;
    SegmentProjection {
        point,
        t,
        distance: (p - point).norm(),
    }
}

/// Returns the minimum distance from `p` to segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    closest_point_on_segment(p, a, b).distance
}
