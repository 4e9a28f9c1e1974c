use crate::error::Result;
use crate::math::vector_2d::reject;
use crate::math::Vector2;
use crate::topology::{Diagram, SegmentId};

use super::{Displacement, DisplacementMap, Propagate};

/// Propagation for the free end of a segment being drawn.
///
/// When the segment starts from a weakly anchored vertex (fewer than two
/// other axes meet there), the drawn end takes the whole vector and only the
/// part of it across the segment's axis is propagated from the start, so the
/// drawn segment keeps its axis. Otherwise the vector is propagated from the
/// drawn end as usual.
#[derive(Debug, Clone)]
pub struct PropagateFromDrawnSegment {
    segment: SegmentId,
    offset: Vector2,
    min_length: f64,
}

impl PropagateFromDrawnSegment {
    #[must_use]
    pub fn new(segment: SegmentId, offset: Vector2) -> Self {
        Self {
            segment,
            offset,
            min_length: 0.0,
        }
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the segment or a traversed entity is not found.
    pub fn execute(&self, diagram: &Diagram) -> Result<DisplacementMap> {
        let seg = diagram.segment(self.segment)?;
        let start = seg.start.owner();
        let end = seg.end.owner();

        // Axes meeting at the start other than the drawn one; fewer than two
        // means the start is weakly anchored.
        let other_axes = diagram
            .movable_edges(start)?
            .into_iter()
            .filter(|e| *e != self.segment)
            .map(|e| diagram.segment(e).map(|s| s.axis))
            .collect::<Result<Vec<_>, _>>()?;
        let mut distinct = other_axes;
        distinct.sort_unstable();
        distinct.dedup();

        if distinct.len() >= 2 {
            return Propagate::new(end, self.offset)
                .with_min_length(self.min_length)
                .execute(diagram);
        }

        let across = reject(&self.offset, seg.axis);
        let mut map = Propagate::new(start, across)
            .excluding(self.segment)
            .with_min_length(self.min_length)
            .execute(diagram)?;
        map.insert(end, Displacement::full(self.offset));
        Ok(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::{Axis, Point2};
    use crate::topology::{Movable, Vertex};

    #[test]
    fn dangling_start_keeps_drawn_axis() {
        let mut d = Diagram::new();
        let s = d.add_junction(Point2::new(0.0, 0.0));
        let e = d.add_junction(Point2::new(50.0, 0.0));
        let seg = d
            .connect_along(Vertex::Junction(s), Vertex::Junction(e), Axis::HORIZONTAL, false)
            .unwrap();
        let map = PropagateFromDrawnSegment::new(seg, Vector2::new(10.0, 5.0))
            .execute(&d)
            .unwrap();
        let start = map.get(&Movable::Junction(s)).unwrap().offset;
        let end = map.get(&Movable::Junction(e)).unwrap().offset;
        assert_abs_diff_eq!(start.x, 0.0);
        assert_abs_diff_eq!(start.y, 5.0);
        assert_abs_diff_eq!(end.x, 10.0);
        assert_abs_diff_eq!(end.y, 5.0);
    }

    #[test]
    fn anchored_start_propagates_from_end() {
        // Drawing right from a corner: the corner has two other axes and stays.
        let mut d = Diagram::new();
        let corner = d.add_junction(Point2::new(0.0, 0.0));
        let up = d.add_junction(Point2::new(0.0, -50.0));
        let left = d.add_junction(Point2::new(-50.0, 0.0));
        let tip = d.add_junction(Point2::new(40.0, 0.0));
        d.connect(Vertex::Junction(corner), Vertex::Junction(up), false)
            .unwrap();
        d.connect(Vertex::Junction(corner), Vertex::Junction(left), false)
            .unwrap();
        let drawn = d
            .connect(Vertex::Junction(corner), Vertex::Junction(tip), false)
            .unwrap();
        let map = PropagateFromDrawnSegment::new(drawn, Vector2::new(25.0, 0.0))
            .execute(&d)
            .unwrap();
        assert!(!map.contains_key(&Movable::Junction(corner)));
        assert_abs_diff_eq!(map[&Movable::Junction(tip)].offset.x, 25.0);
    }
}
