use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::{Point2, POSITION_TOLERANCE};

use super::{CrossingType, Diagram, SegmentId, TopologyError};

/// Two segments that intersect without sharing a vertex.
///
/// Crossings are derived from geometry on demand and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub first: SegmentId,
    pub second: SegmentId,
    pub point: Point2,
    /// Glyph drawn on `first` at this crossing.
    pub first_type: CrossingType,
    /// Glyph drawn on `second` at this crossing.
    pub second_type: CrossingType,
}

impl Diagram {
    /// Derives all visible crossings.
    ///
    /// A crossing closer than `clearance` to any endpoint of either segment is
    /// suppressed, so hop glyphs never crowd real junctions. Segments sharing
    /// a vertex never cross.
    #[must_use]
    pub fn crossings(&self, clearance: f64) -> Vec<Crossing> {
        let clearance = clearance.max(POSITION_TOLERANCE);
        let lines: Vec<(SegmentId, Point2, Point2)> = self
            .segments()
            .filter_map(|(id, _)| self.endpoints(id).ok().map(|(a, b)| (id, a, b)))
            .collect();

        let mut out = Vec::new();
        for (i, &(sa, a0, a1)) in lines.iter().enumerate() {
            for &(sb, b0, b1) in &lines[i + 1..] {
                let (Ok(first), Ok(second)) = (self.segment(sa), self.segment(sb)) else {
                    continue;
                };
                if first.touches(second) {
                    continue;
                }
                let Some((point, _, _)) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1) else {
                    continue;
                };
                let nearest_end = [a0, a1, b0, b1]
                    .iter()
                    .map(|e| (e - point).norm())
                    .fold(f64::INFINITY, f64::min);
                if nearest_end < clearance {
                    continue;
                }
                out.push(Crossing {
                    first: sa,
                    second: sb,
                    point,
                    first_type: first
                        .crossing_types
                        .get(&sb)
                        .copied()
                        .unwrap_or_else(|| CrossingType::derived(first.axis, second.axis)),
                    second_type: second
                        .crossing_types
                        .get(&sa)
                        .copied()
                        .unwrap_or_else(|| CrossingType::derived(second.axis, first.axis)),
                });
            }
        }
        out
    }

    /// Glyph sequence along one segment: each visible crossing with the glyph
    /// this segment uses there, ordered from the segment's start.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found.
    pub fn hops_along(
        &self,
        segment: SegmentId,
        clearance: f64,
    ) -> Result<Vec<(Point2, CrossingType)>, TopologyError> {
        let (start, _) = self.endpoints(segment)?;
        let mut hops: Vec<(Point2, CrossingType)> = self
            .crossings(clearance)
            .into_iter()
            .filter_map(|c| {
                if c.first == segment {
                    Some((c.point, c.first_type))
                } else if c.second == segment {
                    Some((c.point, c.second_type))
                } else {
                    None
                }
            })
            .collect();
        hops.sort_by(|a, b| (a.0 - start).norm().total_cmp(&(b.0 - start).norm()));
        Ok(hops)
    }

    /// Records how `segment` is drawn where it crosses `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is not found.
    pub fn set_crossing_type(
        &mut self,
        segment: SegmentId,
        other: SegmentId,
        crossing_type: CrossingType,
    ) -> Result<(), TopologyError> {
        self.segment(other)?;
        self.segment_mut(segment)?
            .crossing_types
            .insert(other, crossing_type);
        self.touch();
        Ok(())
    }

    /// Returns whether two segments currently intersect away from their ends.
    pub(crate) fn segments_cross(&self, a: SegmentId, b: SegmentId) -> bool {
        let (Ok((a0, a1)), Ok((b0, b1))) = (self.endpoints(a), self.endpoints(b)) else {
            return false;
        };
        segment_segment_intersect_2d(&a0, &a1, &b0, &b1).is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Vertex;

    fn cross_diagram() -> (Diagram, SegmentId, SegmentId) {
        let mut d = Diagram::new();
        let a = d.add_junction(Point2::new(0.0, 0.0));
        let b = d.add_junction(Point2::new(100.0, 0.0));
        let c = d.add_junction(Point2::new(50.0, -50.0));
        let e = d.add_junction(Point2::new(50.0, 50.0));
        let h = d.connect(Vertex::Junction(a), Vertex::Junction(b), false).unwrap();
        let v = d.connect(Vertex::Junction(c), Vertex::Junction(e), false).unwrap();
        (d, h, v)
    }

    #[test]
    fn perpendicular_segments_produce_one_crossing() {
        let (d, h, v) = cross_diagram();
        let crossings = d.crossings(6.0);
        assert_eq!(crossings.len(), 1);
        let c = &crossings[0];
        assert!((c.point.x - 50.0).abs() < 1e-9 && c.point.y.abs() < 1e-9);
        let (on_h, on_v) = if c.first == h {
            (c.first_type, c.second_type)
        } else {
            (c.second_type, c.first_type)
        };
        assert_eq!(on_h, CrossingType::HopUp);
        assert_eq!(on_v, CrossingType::NoHop);
        assert_eq!(d.hops_along(v, 6.0).unwrap().len(), 1);
    }

    #[test]
    fn crossing_near_endpoint_is_suppressed() {
        let mut d = Diagram::new();
        let a = d.add_junction(Point2::new(0.0, 0.0));
        let b = d.add_junction(Point2::new(100.0, 0.0));
        let c = d.add_junction(Point2::new(3.0, -50.0));
        let e = d.add_junction(Point2::new(3.0, 50.0));
        d.connect(Vertex::Junction(a), Vertex::Junction(b), false).unwrap();
        d.connect(Vertex::Junction(c), Vertex::Junction(e), false).unwrap();
        assert!(d.crossings(6.0).is_empty());
        assert_eq!(d.crossings(2.0).len(), 1);
    }

    #[test]
    fn explicit_crossing_type_wins() {
        let (mut d, h, v) = cross_diagram();
        d.set_crossing_type(h, v, CrossingType::HopDown).unwrap();
        let hops = d.hops_along(h, 6.0).unwrap();
        assert_eq!(hops, vec![(Point2::new(50.0, 0.0), CrossingType::HopDown)]);
    }

    #[test]
    fn hops_are_ordered_from_start() {
        let (mut d, h, _) = cross_diagram();
        let c = d.add_junction(Point2::new(20.0, -50.0));
        let e = d.add_junction(Point2::new(20.0, 50.0));
        d.connect(Vertex::Junction(c), Vertex::Junction(e), false).unwrap();
        let hops = d.hops_along(h, 6.0).unwrap();
        assert_eq!(hops.len(), 2);
        assert!(hops[0].0.x < hops[1].0.x);
    }
}
