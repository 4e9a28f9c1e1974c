/// Quadratic easing toward a snap target.
///
/// Given the distance `d` between a candidate and its target, [`Easing::pull`]
/// returns how far the candidate is moved toward the target:
///
/// - `d < snap_radius`: the full distance (the candidate lands on the target),
/// - `snap_radius <= d < ease_radius`: `f(d) = jump * ((ease - d) / (ease - snap))²`,
/// - `d >= ease_radius`: nothing.
///
/// `f(snap_radius) = jump`, `f(ease_radius) = 0` and `f'(ease_radius) = 0`, so
/// the pull fades out smoothly at the ease boundary. The eased distance
/// `d - f(d)` is strictly increasing in `d`, which keeps the motion free of
/// reversals as the pointer crosses the annulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    snap_radius: f64,
    ease_radius: f64,
    jump: f64,
}

impl Easing {
    /// Creates an easing curve. Radii are expected to satisfy
    /// `0 < snap_radius < ease_radius` (enforced by `EditorConfig`).
    #[must_use]
    pub fn new(snap_radius: f64, ease_radius: f64, jump: f64) -> Self {
        Self {
            snap_radius,
            ease_radius,
            jump,
        }
    }

    #[must_use]
    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
    }

    #[must_use]
    pub fn ease_radius(&self) -> f64 {
        self.ease_radius
    }

    /// Evaluates the easing polynomial at distance `d`.
    #[must_use]
    pub fn polynomial(&self, d: f64) -> f64 {
        let span = self.ease_radius - self.snap_radius;
        if span <= 0.0 {
            return 0.0;
        }
        let s = (self.ease_radius - d) / span;
        self.jump * s * s
    }

    /// Distance the candidate is moved toward a target `d` away.
    #[must_use]
    pub fn pull(&self, d: f64) -> f64 {
        let d = d.abs();
        if d < self.snap_radius {
            d
        } else if d < self.ease_radius {
            self.polynomial(d).min(d)
        } else {
            0.0
        }
    }

    /// Returns whether a target `d` away is close enough to land on.
    #[must_use]
    pub fn snaps(&self, d: f64) -> bool {
        d.abs() < self.snap_radius
    }

    /// Returns whether a target `d` away has any effect.
    #[must_use]
    pub fn engages(&self, d: f64) -> bool {
        d.abs() < self.ease_radius
    }

    /// Eases a signed displacement: the result has the sign of `delta` and
    /// magnitude [`Easing::pull`] of its length.
    #[must_use]
    pub fn ease(&self, delta: f64) -> f64 {
        self.pull(delta).copysign(delta)
    }
}
