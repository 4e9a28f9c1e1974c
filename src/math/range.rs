use super::{Direction, Point2, Vector2};

/// A closed interval `[min, max]` on a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range1d {
    pub min: f64,
    pub max: f64,
}

impl Range1d {
    /// Creates a range from two bounds in any order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a degenerate range containing a single value.
    #[must_use]
    pub fn point(v: f64) -> Self {
        Self { min: v, max: v }
    }

    /// Smallest range containing every value, `None` for an empty input.
    #[must_use]
    pub fn enclosing(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self::point(v)),
            Some(r) => Some(Self::new(r.min.min(v), r.max.max(v))),
        })
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Returns the range grown by `pad` on both sides.
    #[must_use]
    pub fn padded(&self, pad: f64) -> Self {
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    #[must_use]
    pub fn translated(&self, by: f64) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns whether the open interiors of the two ranges intersect.
    ///
    /// Ranges that only touch at an end do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min < other.max && other.min < self.max
    }

    /// Signed distance from the end of `self` to the start of `other`.
    ///
    /// Negative when `other` starts before `self` ends.
    #[must_use]
    pub fn gap_to(&self, other: &Self) -> f64 {
        other.min - self.max
    }
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range2d {
    pub x: Range1d,
    pub y: Range1d,
}

impl Range2d {
    #[must_use]
    pub fn new(x: Range1d, y: Range1d) -> Self {
        Self { x, y }
    }

    /// Creates a degenerate box at a single point.
    #[must_use]
    pub fn point(p: &Point2) -> Self {
        Self {
            x: Range1d::point(p.x),
            y: Range1d::point(p.y),
        }
    }

    /// Creates the box spanned by two corners in any order.
    #[must_use]
    pub fn from_corners(a: &Point2, b: &Point2) -> Self {
        Self {
            x: Range1d::new(a.x, b.x),
            y: Range1d::new(a.y, b.y),
        }
    }

    /// Returns the four corners in counter-clockwise order from `(min, min)`.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.x.min, self.y.min),
            Point2::new(self.x.max, self.y.min),
            Point2::new(self.x.max, self.y.max),
            Point2::new(self.x.min, self.y.max),
        ]
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(self.x.center(), self.y.center())
    }

    #[must_use]
    pub fn translated(&self, by: &Vector2) -> Self {
        Self {
            x: self.x.translated(by.x),
            y: self.y.translated(by.y),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
        }
    }

    /// Returns whether `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    /// Projects the box onto a direction.
    #[must_use]
    pub fn project(&self, direction: Direction) -> Range1d {
        project_points(&self.corners(), direction)
    }
}

/// Projects a set of points onto a direction, returning the covered range.
///
/// An empty slice projects to the degenerate range at `0`.
#[must_use]
pub fn project_points(points: &[Point2], direction: Direction) -> Range1d {
    Range1d::enclosing(points.iter().map(|p| direction.component(&p.coords)))
        .unwrap_or(Range1d::point(0.0))
}
