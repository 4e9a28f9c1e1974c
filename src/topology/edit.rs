use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::{Axis, Vector2};

use super::{
    Crossing, CrossingType, Diagram, Grabbable, JunctionId, SegmentData, SegmentId, Vertex,
};

/// Description of a segment to be created by [`Diagram::replace_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSegment {
    pub start: Vertex,
    pub end: Vertex,
    pub is_rigid: bool,
}

impl NewSegment {
    #[must_use]
    pub fn new(start: Vertex, end: Vertex, is_rigid: bool) -> Self {
        Self {
            start,
            end,
            is_rigid,
        }
    }
}

impl Diagram {
    /// Inserts `junction` into `segment`, replacing it with two segments that
    /// meet at the junction.
    ///
    /// The junction is expected to lie on the segment; callers compute the
    /// closest point first.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the junction is
    /// already an endpoint of the segment.
    pub fn split_at(
        &mut self,
        segment: SegmentId,
        junction: JunctionId,
    ) -> Result<(SegmentId, SegmentId)> {
        self.junction(junction)?;
        let seg = self.segment(segment)?;
        let mid = Vertex::Junction(junction);
        if seg.start == mid || seg.end == mid {
            return Err(TopologyError::InvalidTopology(
                "cannot split a segment at its own endpoint".into(),
            )
            .into());
        }
        let halves = [
            NewSegment::new(seg.start, mid, seg.is_rigid),
            NewSegment::new(mid, seg.end, seg.is_rigid),
        ];
        let ids = self.replace_with(segment, &halves)?;
        debug!(?segment, ?junction, "split segment");
        Ok((ids[0], ids[1]))
    }

    /// Atomically swaps one segment for one or more new segments.
    ///
    /// A new segment joining the same two vertices as the old one inherits
    /// all of its crossing types, and neighbors keep their glyph toward it.
    /// Other new segments inherit the glyphs for the neighbors they still
    /// geometrically cross. Nothing is modified if validation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or any vertex is missing, `replacement`
    /// is empty, a new segment is a loop, or a port would receive two edges.
    pub fn replace_with(
        &mut self,
        segment: SegmentId,
        replacement: &[NewSegment],
    ) -> Result<Vec<SegmentId>> {
        let old = self.segment(segment)?.clone();
        self.validate_replacement(&old, replacement)?;

        let neighbors: Vec<(SegmentId, CrossingType)> = self
            .segments()
            .filter_map(|(id, s)| s.crossing_types.get(&segment).map(|t| (id, *t)))
            .collect();

        self.remove_segment(segment)?;
        let mut created = Vec::with_capacity(replacement.len());
        for piece in replacement {
            created.push(self.connect_with_fallback(piece, old.axis)?);
        }
        for &id in &created {
            self.inherit_crossing_types(id, &old, &neighbors)?;
        }
        debug!(?segment, replaced_by = created.len(), "replaced segment");
        Ok(created)
    }

    /// Removes a junction, segment or symbol.
    ///
    /// Deleting a junction or symbol also deletes every attached segment.
    /// Returns the surviving junctions that lost an edge, so callers can
    /// decide whether they collapse into a straight line or revert to a
    /// crossing. Their glyphs are refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found.
    pub fn delete(&mut self, target: Grabbable) -> Result<Vec<JunctionId>> {
        let mut orphans = Vec::new();
        let edges = match target {
            Grabbable::Junction(j) => self.junction(j)?.edges.clone(),
            Grabbable::Segment(s) => vec![s],
            Grabbable::Symbol(s) => self.symbol(s)?.edges().collect(),
        };
        for e in edges {
            let data = self.remove_segment(e)?;
            orphans.extend([data.start, data.end].into_iter().filter_map(Vertex::as_junction));
        }
        match target {
            Grabbable::Junction(j) => {
                self.junctions.remove(j);
            }
            Grabbable::Symbol(s) => {
                self.symbols.remove(s);
            }
            Grabbable::Segment(_) => {}
        }
        orphans.sort_unstable();
        orphans.dedup();
        orphans.retain(|j| self.junctions.contains_key(*j));
        for &j in &orphans {
            self.refresh_glyph(j)?;
        }
        self.touch();
        debug!(?target, orphans = orphans.len(), "deleted");
        Ok(orphans)
    }

    /// Turns a four-way junction made of two straight lines into two
    /// segments that cross without a shared vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction is missing or its edges do not form
    /// two collinear pass-through pairs.
    pub fn convert_to_crossing(&mut self, junction: JunctionId) -> Result<(SegmentId, SegmentId)> {
        let pairs = self.pass_through_pairs(junction)?;
        let merged = self.merge_through(junction, &pairs)?;
        let [first, second] = merged[..] else {
            return Err(TopologyError::InvalidTopology("expected two merged segments".into()).into());
        };
        let first_axis = self.segment(first)?.axis;
        let second_axis = self.segment(second)?.axis;
        self.set_crossing_type(first, second, CrossingType::derived(first_axis, second_axis))?;
        self.set_crossing_type(second, first, CrossingType::derived(second_axis, first_axis))?;
        debug!(?junction, "converted junction to crossing");
        Ok((first, second))
    }

    /// Undoes [`Diagram::split_at`]: joins the two edges of `junction` back
    /// into one segment and removes the junction.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction does not have exactly two edges.
    pub(crate) fn rejoin_split(&mut self, junction: JunctionId) -> Result<SegmentId> {
        let pair = match self.junction(junction)?.edges[..] {
            [a, b] => (a, b),
            _ => {
                return Err(
                    TopologyError::InvalidTopology("junction does not join two edges".into()).into(),
                )
            }
        };
        let merged = self.merge_through(junction, &[pair])?;
        merged
            .first()
            .copied()
            .ok_or_else(|| TopologyError::InvalidTopology("nothing merged".into()).into())
    }

    /// Joins two crossing segments with a new junction at their intersection.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is missing or they no longer cross.
    pub fn convert_to_junction(&mut self, crossing: &Crossing) -> Result<JunctionId> {
        let (a0, a1) = self.endpoints(crossing.first)?;
        let (b0, b1) = self.endpoints(crossing.second)?;
        let first = self.segment(crossing.first)?;
        let second = self.segment(crossing.second)?;
        if first.touches(second) {
            return Err(TopologyError::InvalidTopology("segments already share a vertex".into()).into());
        }
        let (point, _, _) = crate::math::intersect_2d::segment_segment_intersect_2d(&a0, &a1, &b0, &b1)
            .ok_or_else(|| TopologyError::InvalidTopology("segments no longer cross".into()))?;

        let junction = self.add_junction(point);
        self.split_at(crossing.first, junction)?;
        self.split_at(crossing.second, junction)?;
        debug!(?junction, "converted crossing to junction");
        Ok(junction)
    }

    /// Replaces each pair of edges meeting at `junction` with one segment
    /// joining their far ends, then removes the junction.
    ///
    /// Crossing types on either side of a pair carry over to the merged
    /// segment wherever it still crosses the other segment. Glyphs of the far
    /// ends are left alone since their valence is unchanged.
    fn merge_through(
        &mut self,
        junction: JunctionId,
        pairs: &[(SegmentId, SegmentId)],
    ) -> Result<Vec<SegmentId>> {
        type Inherited = (NewSegment, HashMap<SegmentId, CrossingType>, Vec<(SegmentId, CrossingType)>);

        let here = Vertex::Junction(junction);
        let mut plans: Vec<Inherited> = Vec::with_capacity(pairs.len());
        for &(a, b) in pairs {
            let sa = self.segment(a)?;
            let sb = self.segment(b)?;
            let dangling = || TopologyError::InvalidTopology("dangling adjacency".into());
            let far_a = sa.other_end(here).ok_or_else(dangling)?;
            let far_b = sb.other_end(here).ok_or_else(dangling)?;
            if far_a == far_b {
                return Err(
                    TopologyError::InvalidTopology("edges loop back to one vertex".into()).into(),
                );
            }
            let mut own = sa.crossing_types.clone();
            own.extend(sb.crossing_types.iter().map(|(k, v)| (*k, *v)));
            let theirs = self
                .segments()
                .filter_map(|(id, s)| {
                    s.crossing_types
                        .get(&a)
                        .or_else(|| s.crossing_types.get(&b))
                        .map(|t| (id, *t))
                })
                .collect();
            plans.push((
                NewSegment::new(far_a, far_b, sa.is_rigid && sb.is_rigid),
                own,
                theirs,
            ));
        }

        for e in self.junction(junction)?.edges.clone() {
            self.remove_segment(e)?;
        }
        self.junctions.remove(junction);

        let mut merged = Vec::with_capacity(plans.len());
        for (piece, own, theirs) in plans {
            let id = self.connect(piece.start, piece.end, piece.is_rigid)?;
            for (other, t) in own {
                if self.still_crosses(id, other) {
                    self.segment_mut(id)?.crossing_types.insert(other, t);
                }
            }
            for (other, t) in theirs {
                if self.still_crosses(id, other) {
                    self.segment_mut(other)?.crossing_types.insert(id, t);
                }
            }
            merged.push(id);
        }
        Ok(merged)
    }

    /// Whether two distinct, unconnected live segments intersect.
    fn still_crosses(&self, a: SegmentId, b: SegmentId) -> bool {
        match (self.segment(a), self.segment(b)) {
            (Ok(sa), Ok(sb)) => a != b && !sa.touches(sb) && self.segments_cross(a, b),
            _ => false,
        }
    }

    /// Groups the four edges of a junction into two collinear pairs that
    /// pass straight through it.
    fn pass_through_pairs(
        &self,
        junction: JunctionId,
    ) -> Result<[(SegmentId, SegmentId); 2], TopologyError> {
        let data = self.junction(junction)?;
        if data.edges.len() != 4 {
            return Err(TopologyError::NotCrossingCapable(format!(
                "needs four edges, has {}",
                data.edges.len()
            )));
        }
        let here = Vertex::Junction(junction);
        let mut outgoing: Vec<(SegmentId, Axis, Vector2, Vertex)> = Vec::with_capacity(4);
        for &e in &data.edges {
            let seg = self.segment(e)?;
            let far = seg
                .other_end(here)
                .ok_or_else(|| TopologyError::InvalidTopology("dangling adjacency".into()))?;
            outgoing.push((e, seg.axis, self.vertex_position(far)? - data.position, far));
        }

        let mut pairs = Vec::with_capacity(2);
        let mut used = [false; 4];
        for i in 0..4 {
            if used[i] {
                continue;
            }
            let partner = (i + 1..4).find(|&k| {
                !used[k]
                    && outgoing[k].1 == outgoing[i].1
                    && outgoing[k].2.dot(&outgoing[i].2) < 0.0
                    && outgoing[k].3 != outgoing[i].3
            });
            let Some(k) = partner else {
                return Err(TopologyError::NotCrossingCapable(
                    "edges do not form two straight lines".into(),
                ));
            };
            used[i] = true;
            used[k] = true;
            pairs.push((outgoing[i].0, outgoing[k].0));
        }
        match pairs.as_slice() {
            [a, b] => Ok([*a, *b]),
            _ => Err(TopologyError::NotCrossingCapable(
                "edges do not form two straight lines".into(),
            )),
        }
    }

    fn validate_replacement(&self, old: &SegmentData, replacement: &[NewSegment]) -> Result<()> {
        if replacement.is_empty() {
            return Err(TopologyError::InvalidTopology("replacement must not be empty".into()).into());
        }
        let mut claimed_ports = Vec::new();
        for piece in replacement {
            if piece.start == piece.end {
                return Err(
                    TopologyError::InvalidTopology("segment endpoints must differ".into()).into(),
                );
            }
            for v in [piece.start, piece.end] {
                self.vertex_position(v)?;
                if let Vertex::Port(p) = v {
                    let freed = old.start == v || old.end == v;
                    if claimed_ports.contains(&p) || (!freed && self.port(p)?.edge.is_some()) {
                        return Err(TopologyError::PortOccupied.into());
                    }
                    claimed_ports.push(p);
                }
            }
        }
        Ok(())
    }

    fn connect_with_fallback(&mut self, piece: &NewSegment, fallback: Axis) -> Result<SegmentId> {
        let a = self.vertex_position(piece.start)?;
        let b = self.vertex_position(piece.end)?;
        let axis = Axis::from_vector(&(b - a)).unwrap_or(fallback);
        self.connect_along(piece.start, piece.end, axis, piece.is_rigid)
    }

    fn inherit_crossing_types(
        &mut self,
        id: SegmentId,
        old: &SegmentData,
        neighbors: &[(SegmentId, CrossingType)],
    ) -> Result<(), TopologyError> {
        let seg = self.segment(id)?.clone();
        let unchanged = seg.same_endpoints(old.start, old.end);
        let keeps = |this: &Self, other: SegmentId| -> bool {
            let Ok(other_data) = this.segment(other) else {
                return false;
            };
            unchanged || (!seg.touches(other_data) && this.segments_cross(id, other))
        };

        let own: Vec<(SegmentId, CrossingType)> = old
            .crossing_types
            .iter()
            .filter(|(other, _)| keeps(self, **other))
            .map(|(k, v)| (*k, *v))
            .collect();
        let theirs: Vec<(SegmentId, CrossingType)> = neighbors
            .iter()
            .filter(|(other, _)| keeps(self, *other))
            .copied()
            .collect();

        self.segment_mut(id)?.crossing_types.extend(own);
        for (other, t) in theirs {
            self.segment_mut(other)?.crossing_types.insert(id, t);
        }
        Ok(())
    }
}
