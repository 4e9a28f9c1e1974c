use super::{Axis, Vector2, TOLERANCE};

/// Component of `v` along `axis`.
#[must_use]
pub fn project(v: &Vector2, axis: Axis) -> Vector2 {
    let u = axis.unit();
    u * u.dot(v)
}

/// Component of `v` perpendicular to `axis`.
#[must_use]
pub fn reject(v: &Vector2, axis: Axis) -> Vector2 {
    v - project(v, axis)
}

/// Oblique projection of `v` onto `onto`, parallel to `along`.
///
/// Returns the unique vector `w` on `onto` such that `v - w` lies on `along`.
/// For perpendicular axes this is the ordinary projection. Returns `None`
/// when the two axes coincide.
#[must_use]
pub fn project_along(v: &Vector2, onto: Axis, along: Axis) -> Option<Vector2> {
    let u = onto.unit();
    let a = along.unit();
    let denom = u.perp(&a);
    if denom.abs() < TOLERANCE {
        return None;
    }
    Some(u * (v.perp(&a) / denom))
}

/// Returns whether two vectors are equal within `tol` per component.
#[must_use]
pub fn approx_eq(a: &Vector2, b: &Vector2, tol: f64) -> bool {
    (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn project_and_reject_sum_to_input() {
        let v = Vector2::new(3.0, 4.0);
        let p = project(&v, Axis::HORIZONTAL);
        let r = reject(&v, Axis::HORIZONTAL);
        assert_abs_diff_eq!(p.x, 3.0);
        assert_abs_diff_eq!(r.y, 4.0);
        assert!(approx_eq(&(p + r), &v, 1e-12));
    }

    #[test]
    fn oblique_projection_onto_orthogonal_axis() {
        let v = Vector2::new(3.0, 4.0);
        let w = project_along(&v, Axis::VERTICAL, Axis::HORIZONTAL).unwrap();
        assert!(approx_eq(&w, &Vector2::new(0.0, 4.0), 1e-12));
    }

    #[test]
    fn oblique_projection_onto_diagonal() {
        // Keeping a horizontal edge horizontal while moving along +45°.
        let v = Vector2::new(0.0, 10.0);
        let w = project_along(&v, Axis::DIAGONAL, Axis::HORIZONTAL).unwrap();
        assert_abs_diff_eq!(w.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(w.y, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn oblique_projection_parallel_axes_is_none() {
        let v = Vector2::new(1.0, 1.0);
        assert!(project_along(&v, Axis::VERTICAL, Axis::VERTICAL).is_none());
    }
}
