use crate::math::Point2;

use super::handle::SegmentId;

/// Marker drawn at a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JunctionGlyph {
    /// Dot for three or more edges, nothing for pass-through points.
    #[default]
    Default,
    /// Open wire end waiting to be plugged into something.
    Plug,
}

impl JunctionGlyph {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Default => Self::Plug,
            Self::Plug => Self::Default,
        }
    }
}

/// Data associated with a junction.
#[derive(Debug, Clone)]
pub struct JunctionData {
    /// The position of the junction.
    pub position: Point2,
    /// Incident segments, in attachment order.
    pub edges: Vec<SegmentId>,
    pub glyph: JunctionGlyph,
}

impl JunctionData {
    /// Creates an unconnected junction at the given point.
    #[must_use]
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            edges: Vec::new(),
            glyph: JunctionGlyph::Default,
        }
    }
}
