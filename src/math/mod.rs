pub mod axis;
pub mod distance_2d;
pub mod easing;
pub mod intersect_2d;
pub mod range;
pub mod vector_2d;

pub use axis::{Axis, Direction, Rotation};
pub use easing::Easing;
pub use range::{Range1d, Range2d};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-9;

/// Tolerance for positions produced by interactive edits.
///
/// Pointer-driven coordinates accumulate more error than analytic ones, so
/// coincidence tests on diagram positions use this looser bound.
pub const POSITION_TOLERANCE: f64 = 1e-6;
