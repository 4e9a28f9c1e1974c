use std::collections::HashMap;

use crate::math::Axis;

use super::handle::{SegmentId, Vertex};

/// How a segment is drawn where it crosses another segment without a junction.
///
/// The hop variants name the side the arc bulges toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrossingType {
    /// Drawn straight through.
    #[default]
    NoHop,
    HopUp,
    HopDown,
    HopLeft,
    HopRight,
}

impl CrossingType {
    /// The glyph a segment on `own` gets when crossing a segment on `other`,
    /// absent an explicit choice: the flatter of the two hops, upward for
    /// horizontal-ish lines and leftward otherwise.
    #[must_use]
    pub fn derived(own: Axis, other: Axis) -> Self {
        let own_slope = own.unit().y.abs();
        let other_slope = other.unit().y.abs();
        if own_slope < other_slope {
            Self::HopUp
        } else if own_slope > other_slope || own > other {
            Self::NoHop
        } else {
            Self::HopLeft
        }
    }

    #[must_use]
    pub fn is_hop(self) -> bool {
        self != Self::NoHop
    }
}

/// Data associated with a segment.
///
/// A segment connects two vertices along an axis that always matches the
/// direction from `start` to `end`.
#[derive(Debug, Clone)]
pub struct SegmentData {
    /// Start vertex of the segment.
    pub start: Vertex,
    /// End vertex of the segment.
    pub end: Vertex,
    /// The axis of `end - start`.
    pub axis: Axis,
    /// Rigid segments never stretch or contract.
    pub is_rigid: bool,
    /// Glyph used where this segment crosses each listed neighbor.
    pub crossing_types: HashMap<SegmentId, CrossingType>,
}

impl SegmentData {
    #[must_use]
    pub fn new(start: Vertex, end: Vertex, axis: Axis, is_rigid: bool) -> Self {
        Self {
            start,
            end,
            axis,
            is_rigid,
            crossing_types: HashMap::new(),
        }
    }

    /// Returns the endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, v: Vertex) -> Option<Vertex> {
        if self.start == v {
            Some(self.end)
        } else if self.end == v {
            Some(self.start)
        } else {
            None
        }
    }

    /// Returns whether the segment joins the same two vertices as `other`,
    /// in either orientation.
    #[must_use]
    pub fn same_endpoints(&self, start: Vertex, end: Vertex) -> bool {
        (self.start == start && self.end == end) || (self.start == end && self.end == start)
    }

    /// Returns whether the two segments share an endpoint.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_hops_over_vertical() {
        assert_eq!(
            CrossingType::derived(Axis::HORIZONTAL, Axis::VERTICAL),
            CrossingType::HopUp
        );
        assert_eq!(
            CrossingType::derived(Axis::VERTICAL, Axis::HORIZONTAL),
            CrossingType::NoHop
        );
    }

    #[test]
    fn equal_slopes_pick_exactly_one_hop() {
        let a = CrossingType::derived(Axis::DIAGONAL, Axis::ANTI_DIAGONAL);
        let b = CrossingType::derived(Axis::ANTI_DIAGONAL, Axis::DIAGONAL);
        assert_ne!(a.is_hop(), b.is_hop());
    }
}
