use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::ops::{Add, Neg, Sub};

use super::{Vector2, TOLERANCE};

/// Resolution of the canonical axis key.
const KEYS_PER_DEGREE: f64 = 1_000_000.0;
const HALF_TURN: u32 = 180_000_000;
const HORIZONTAL_KEY: u32 = 0;
const DIAGONAL_KEY: u32 = 45_000_000;
const VERTICAL_KEY: u32 = 90_000_000;
const ANTI_DIAGONAL_KEY: u32 = 135_000_000;

/// An undirected line direction.
///
/// An axis is equal to its own negation: `(1, 0)` and `(-1, 0)` both map to
/// [`Axis::HORIZONTAL`]. Axes are interned by a quantized canonical angle in
/// `[0°, 180°)`, so two directions that differ only by floating-point noise
/// compare equal and hash identically. The four standard axes have exact keys
/// and exact unit vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Axis {
    key: u32,
}

impl Axis {
    /// The x axis.
    pub const HORIZONTAL: Self = Self { key: HORIZONTAL_KEY };
    /// The y axis.
    pub const VERTICAL: Self = Self { key: VERTICAL_KEY };
    /// The +45° axis.
    pub const DIAGONAL: Self = Self { key: DIAGONAL_KEY };
    /// The −45° axis.
    pub const ANTI_DIAGONAL: Self = Self { key: ANTI_DIAGONAL_KEY };

    /// Derives the axis of a vector.
    ///
    /// Returns `None` for zero-length or non-finite vectors; callers fall back
    /// to a default axis instead of failing.
    #[must_use]
    pub fn from_vector(v: &Vector2) -> Option<Self> {
        if !(v.x.is_finite() && v.y.is_finite()) || v.norm() < TOLERANCE {
            return None;
        }
        Some(Self::from_degrees(v.y.atan2(v.x).to_degrees()))
    }

    /// Returns the axis at the given angle (any angle, taken modulo 180°).
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        let canonical = degrees.rem_euclid(180.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let key = (canonical * KEYS_PER_DEGREE).round() as u32 % HALF_TURN;
        Self { key }
    }

    /// Returns the canonical angle of the axis in `[0°, 180°)`.
    #[must_use]
    pub fn degrees(self) -> f64 {
        f64::from(self.key) / KEYS_PER_DEGREE
    }

    /// Returns the unit vector of the axis pointing into the upper half-plane
    /// (or along +x for the horizontal axis).
    #[must_use]
    pub fn unit(self) -> Vector2 {
        match self.key {
            HORIZONTAL_KEY => Vector2::new(1.0, 0.0),
            VERTICAL_KEY => Vector2::new(0.0, 1.0),
            DIAGONAL_KEY => Vector2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            ANTI_DIAGONAL_KEY => Vector2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            _ => {
                let radians = self.degrees().to_radians();
                Vector2::new(radians.cos(), radians.sin())
            }
        }
    }

    /// Returns the axis rotated by 90°.
    #[must_use]
    pub fn orthogonal(self) -> Self {
        Self {
            key: (self.key + VERTICAL_KEY) % HALF_TURN,
        }
    }

    /// Returns the positive direction of this axis.
    #[must_use]
    pub fn direction(self) -> Direction {
        Direction(self.unit())
    }

    /// Returns whether `v` lies along this axis (zero vectors do).
    #[must_use]
    pub fn is_parallel(self, v: &Vector2) -> bool {
        let len = v.norm();
        len < TOLERANCE || self.unit().perp(v).abs() / len < 1e-7
    }
}

/// A unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction(Vector2);

impl Direction {
    /// Normalizes a vector into a direction, `None` for zero vectors.
    #[must_use]
    pub fn from_vector(v: &Vector2) -> Option<Self> {
        let len = v.norm();
        if !len.is_finite() || len < TOLERANCE {
            return None;
        }
        Some(Self(v / len))
    }

    /// Returns the unit vector.
    #[must_use]
    pub fn vector(self) -> Vector2 {
        self.0
    }

    /// Returns the undirected axis of this direction.
    #[must_use]
    pub fn axis(self) -> Axis {
        Axis::from_degrees(self.0.y.atan2(self.0.x).to_degrees())
    }

    /// Returns the direction rotated by `rotation`.
    #[must_use]
    pub fn rotated(self, rotation: Rotation) -> Self {
        Self(rotation.apply(&self.0))
    }

    /// Returns the counter-clockwise perpendicular direction.
    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self(Vector2::new(-self.0.y, self.0.x))
    }

    /// Signed length of `v` along this direction.
    #[must_use]
    pub fn component(self, v: &Vector2) -> f64 {
        self.0.dot(v)
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// A signed planar rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    radians: f64,
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { radians: 0.0 };

    #[must_use]
    pub fn from_radians(radians: f64) -> Self {
        Self { radians }
    }

    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    /// Returns a rotation by `n` quarter turns (counter-clockwise for `n > 0`).
    #[must_use]
    pub fn quarter_turns(n: i32) -> Self {
        Self::from_degrees(90.0 * f64::from(n))
    }

    /// Returns the rotation that takes `from` onto `to`.
    #[must_use]
    pub fn between(from: Direction, to: Direction) -> Self {
        let a = from.vector();
        let b = to.vector();
        Self {
            radians: a.perp(&b).atan2(a.dot(&b)),
        }
    }

    #[must_use]
    pub fn radians(self) -> f64 {
        self.radians
    }

    #[must_use]
    pub fn degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    /// Returns the equivalent rotation with angle in `(-π, π]`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut r = self.radians.rem_euclid(2.0 * PI);
        if r > PI {
            r -= 2.0 * PI;
        }
        Self { radians: r }
    }

    /// Rotates a vector. Whole quarter turns are applied exactly.
    #[must_use]
    pub fn apply(self, v: &Vector2) -> Vector2 {
        let quarters = self.degrees() / 90.0;
        if (quarters - quarters.round()).abs() < 1e-9 {
            #[allow(clippy::cast_possible_truncation)]
            let n = (quarters.round() as i64).rem_euclid(4);
            return match n {
                0 => *v,
                1 => Vector2::new(-v.y, v.x),
                2 => -v,
                _ => Vector2::new(v.y, -v.x),
            };
        }
        let (sin, cos) = self.radians.sin_cos();
        Vector2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
    }
}

impl Add for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            radians: self.radians + rhs.radians,
        }
    }
}

impl Sub for Rotation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            radians: self.radians - rhs.radians,
        }
    }
}

impl Neg for Rotation {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            radians: -self.radians,
        }
    }
}
