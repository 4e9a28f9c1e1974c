mod drawn;

pub use drawn::PropagateFromDrawnSegment;

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Result, TopologyError};
use crate::math::vector_2d::{approx_eq, project_along};
use crate::math::{Axis, Vector2, POSITION_TOLERANCE};
use crate::topology::{Diagram, Movable, SegmentId};

/// How a movable follows a propagated displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Moves by the whole propagated vector.
    Full,
    /// Moves only along the retained axis; the rest is absorbed by stretching
    /// the edge it was reached through.
    Along(Axis),
}

/// Displacement assigned to one movable. Unlisted movables do not move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub kind: MoveKind,
    pub offset: Vector2,
}

impl Displacement {
    #[must_use]
    pub fn full(offset: Vector2) -> Self {
        Self {
            kind: MoveKind::Full,
            offset,
        }
    }

    #[must_use]
    pub fn along(axis: Axis, offset: Vector2) -> Self {
        Self {
            kind: MoveKind::Along(axis),
            offset,
        }
    }
}

pub type DisplacementMap = HashMap<Movable, Displacement>;

/// Distributes a seed displacement over the diagram like a mechanical linkage.
///
/// Starting from the seeds, each edge either transfers motion rigidly or
/// absorbs its own component of the motion by stretching. A neighbor reached
/// through a stretching edge keeps the motion across the edge and moves along
/// its other axis, so chains of axis-aligned segments telescope. An edge
/// shortened past the minimum length pushes its far end along. A movable
/// reached through paths that disagree moves by its seed's full vector.
#[derive(Debug, Clone)]
pub struct Propagate {
    seeds: Vec<(Movable, Vector2)>,
    excluded: Option<SegmentId>,
    min_length: f64,
}

impl Propagate {
    /// Propagates `offset` applied to a single movable.
    #[must_use]
    pub fn new(seed: Movable, offset: Vector2) -> Self {
        Self::from_seeds(vec![(seed, offset)])
    }

    /// Propagates several seeds at once; each moves by its own offset.
    #[must_use]
    pub fn from_seeds(seeds: Vec<(Movable, Vector2)>) -> Self {
        Self {
            seeds,
            excluded: None,
            min_length: 0.0,
        }
    }

    /// Skips one segment during traversal.
    #[must_use]
    pub fn excluding(mut self, segment: SegmentId) -> Self {
        self.excluded = Some(segment);
        self
    }

    /// Length below which a contracting edge starts pushing its far end.
    #[must_use]
    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length.max(0.0);
        self
    }

    /// Computes the displacement of every reached movable.
    ///
    /// # Errors
    ///
    /// Returns an error if a seed or a traversed entity is not found.
    pub fn execute(&self, diagram: &Diagram) -> Result<DisplacementMap> {
        let mut map = DisplacementMap::new();
        // Index of the seed each reached movable descends from.
        let mut origin: HashMap<Movable, usize> = HashMap::new();
        let mut stack = Vec::new();
        for (i, &(m, offset)) in self.seeds.iter().enumerate() {
            if !diagram.contains(m) {
                return Err(TopologyError::EntityNotFound("movable").into());
            }
            map.insert(m, Displacement::full(offset));
            origin.entry(m).or_insert(i);
            stack.push(m);
        }

        while let Some(m) = stack.pop() {
            let carried = map.get(&m).map_or_else(Vector2::zeros, |d| d.offset);
            let from = origin.get(&m).copied().unwrap_or(0);
            for e in diagram.movable_edges(m)? {
                if Some(e) == self.excluded {
                    continue;
                }
                let Some((far, proposal)) = self.transfer(diagram, m, e, &carried)? else {
                    continue;
                };
                match map.get(&far) {
                    None => {
                        map.insert(far, proposal);
                        origin.insert(far, from);
                        stack.push(far);
                    }
                    Some(existing)
                        if existing.kind == MoveKind::Full
                            || approx_eq(&existing.offset, &proposal.offset, POSITION_TOLERANCE) => {}
                    Some(_) => {
                        // Conflicting constraints: the movable follows its
                        // seed rigidly, whichever path reached it first.
                        let seed = origin.get(&far).map_or(from, |&o| o.min(from));
                        let offset = self.seeds.get(seed).map_or(carried, |&(_, v)| v);
                        map.insert(far, Displacement::full(offset));
                        origin.insert(far, seed);
                        stack.push(far);
                    }
                }
            }
        }
        trace!(reached = map.len(), "propagated displacement");
        Ok(map)
    }

    /// Motion handed across edge `e` from `near` carrying `carried`, or
    /// `None` if the edge absorbs all of it.
    fn transfer(
        &self,
        diagram: &Diagram,
        near: Movable,
        e: SegmentId,
        carried: &Vector2,
    ) -> Result<Option<(Movable, Displacement)>, TopologyError> {
        let seg = diagram.segment(e)?;
        let (near_vertex, far_vertex) = if seg.start.owner() == near {
            (seg.start, seg.end)
        } else {
            (seg.end, seg.start)
        };
        let far = far_vertex.owner();
        if far == near {
            return Ok(None);
        }
        if seg.is_rigid {
            return Ok(Some((far, Displacement::full(*carried))));
        }

        let span = diagram.vertex_position(far_vertex)? - diagram.vertex_position(near_vertex)?;
        let length = span.norm();
        let axis_unit = seg.axis.unit();
        let u = if axis_unit.dot(&span) < 0.0 {
            -axis_unit
        } else {
            axis_unit
        };
        let along = carried.dot(&u);
        let perp = carried - u * along;
        let push = if length > POSITION_TOLERANCE {
            (along - (length - self.min_length).max(0.0)).max(0.0)
        } else {
            0.0
        };
        let moves_across = perp.norm() > POSITION_TOLERANCE;
        let pushes = push > POSITION_TOLERANCE;
        if !moves_across && !pushes {
            return Ok(None);
        }

        let axes = diagram.incident_axes(far)?;
        if axes.len() > 2 {
            return Ok(Some((far, Displacement::full(*carried))));
        }
        let retained = axes
            .iter()
            .copied()
            .find(|a| *a != seg.axis)
            .unwrap_or_else(|| seg.axis.orthogonal());
        let Some(across) = project_along(&perp, retained, seg.axis) else {
            return Ok(Some((far, Displacement::full(*carried))));
        };
        let offset = across + u * push;
        let displacement = match (moves_across, pushes) {
            (true, true) => Displacement::full(offset),
            (true, false) => Displacement::along(retained, offset),
            (false, _) => Displacement::along(seg.axis, offset),
        };
        Ok(Some((far, displacement)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::Point2;
    use crate::topology::{JunctionId, Vertex};

    fn junctions(d: &mut Diagram, pts: &[(f64, f64)]) -> Vec<JunctionId> {
        pts.iter()
            .map(|&(x, y)| d.add_junction(Point2::new(x, y)))
            .collect()
    }

    fn chain(d: &mut Diagram, js: &[JunctionId], rigid: bool) -> Vec<SegmentId> {
        js.windows(2)
            .map(|w| {
                d.connect(Vertex::Junction(w[0]), Vertex::Junction(w[1]), rigid)
                    .unwrap()
            })
            .collect()
    }

    fn offset_of(map: &DisplacementMap, j: JunctionId) -> Vector2 {
        map.get(&Movable::Junction(j))
            .map_or_else(Vector2::zeros, |d| d.offset)
    }

    #[test]
    fn lone_junction_moves_alone() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (50.0, 50.0)]);
        let v = Vector2::new(7.0, -3.0);
        let map = Propagate::new(Movable::Junction(js[0]), v).execute(&d).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(offset_of(&map, js[0]), v);
    }

    #[test]
    fn perpendicular_motion_is_transferred() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (100.0, 0.0)]);
        chain(&mut d, &js, false);
        let map = Propagate::new(Movable::Junction(js[1]), Vector2::new(0.0, 40.0))
            .execute(&d)
            .unwrap();
        let a = map.get(&Movable::Junction(js[0])).unwrap();
        assert_eq!(a.kind, MoveKind::Along(Axis::VERTICAL));
        assert_abs_diff_eq!(a.offset.y, 40.0);
    }

    #[test]
    fn motion_along_edge_is_absorbed() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (100.0, 0.0)]);
        chain(&mut d, &js, false);
        let map = Propagate::new(Movable::Junction(js[1]), Vector2::new(30.0, 0.0))
            .execute(&d)
            .unwrap();
        assert!(!map.contains_key(&Movable::Junction(js[0])));
    }

    #[test]
    fn corner_telescopes() {
        // a ── b
        //      │
        //      c
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (100.0, 0.0), (100.0, 60.0)]);
        chain(&mut d, &js, false);
        let map = Propagate::new(Movable::Junction(js[1]), Vector2::new(10.0, 20.0))
            .execute(&d)
            .unwrap();
        // a keeps the horizontal edge horizontal, c keeps the vertical one vertical.
        assert_abs_diff_eq!(offset_of(&map, js[0]).x, 0.0);
        assert_abs_diff_eq!(offset_of(&map, js[0]).y, 20.0);
        assert_abs_diff_eq!(offset_of(&map, js[2]).x, 10.0);
        assert_abs_diff_eq!(offset_of(&map, js[2]).y, 0.0);
    }

    #[test]
    fn contracting_chain_never_inverts() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        chain(&mut d, &js, false);
        let map = Propagate::new(Movable::Junction(js[3]), Vector2::new(-25.0, 0.0))
            .execute(&d)
            .unwrap();
        let xs: Vec<f64> = js
            .iter()
            .zip([0.0, 10.0, 20.0, 30.0])
            .map(|(j, x0)| x0 + offset_of(&map, *j).x)
            .collect();
        assert_abs_diff_eq!(xs[0], 0.0);
        assert_abs_diff_eq!(xs[1], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xs[2], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xs[3], 5.0, epsilon = 1e-9);
        for j in &js {
            assert_abs_diff_eq!(offset_of(&map, *j).y, 0.0);
        }
    }

    #[test]
    fn min_length_pushes_earlier() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (10.0, 0.0)]);
        chain(&mut d, &js, false);
        let map = Propagate::new(Movable::Junction(js[1]), Vector2::new(-8.0, 0.0))
            .with_min_length(5.0)
            .execute(&d)
            .unwrap();
        assert_abs_diff_eq!(offset_of(&map, js[0]).x, -3.0, epsilon = 1e-9);
    }

    #[test]
    fn rigid_edge_transfers_full_motion() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (40.0, 0.0)]);
        chain(&mut d, &js, true);
        let v = Vector2::new(15.0, 0.0);
        let map = Propagate::new(Movable::Junction(js[1]), v).execute(&d).unwrap();
        let a = map.get(&Movable::Junction(js[0])).unwrap();
        assert_eq!(a.kind, MoveKind::Full);
        assert_eq!(a.offset, v);
    }

    #[test]
    fn excluded_segment_is_not_traversed() {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (100.0, 0.0)]);
        let segs = chain(&mut d, &js, true);
        let map = Propagate::new(Movable::Junction(js[1]), Vector2::new(0.0, 5.0))
            .excluding(segs[0])
            .execute(&d)
            .unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn three_axis_node_moves_fully() {
        let mut d = Diagram::new();
        let js = junctions(
            &mut d,
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (150.0, 50.0)],
        );
        let hub = js[1];
        chain(&mut d, &[js[0], hub], false);
        chain(&mut d, &[hub, js[2]], false);
        chain(&mut d, &[hub, js[3]], false);
        let map = Propagate::new(Movable::Junction(js[0]), Vector2::new(0.0, 10.0))
            .execute(&d)
            .unwrap();
        let h = map.get(&Movable::Junction(hub)).unwrap();
        assert_eq!(h.kind, MoveKind::Full);
        assert_abs_diff_eq!(h.offset.y, 10.0);
    }

    /// a ── c and a │ f, with c and f joined by a rigid diagonal.
    fn rigid_shortcut(edges_first_to_c: bool) -> (Diagram, Vec<JunctionId>) {
        let mut d = Diagram::new();
        let js = junctions(&mut d, &[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        let (a, c, f) = (js[0], js[1], js[2]);
        if edges_first_to_c {
            chain(&mut d, &[a, c], false);
            chain(&mut d, &[a, f], false);
        } else {
            chain(&mut d, &[a, f], false);
            chain(&mut d, &[a, c], false);
        }
        chain(&mut d, &[c, f], true);
        (d, js)
    }

    #[test]
    fn conflicting_paths_follow_the_seed() {
        let v = Vector2::new(10.0, 20.0);
        for order in [true, false] {
            let (d, js) = rigid_shortcut(order);
            let map = Propagate::new(Movable::Junction(js[0]), v).execute(&d).unwrap();
            for j in &js[1..] {
                let m = map.get(&Movable::Junction(*j)).unwrap();
                assert_eq!(m.kind, MoveKind::Full);
                assert_abs_diff_eq!(m.offset.x, v.x, epsilon = 1e-9);
                assert_abs_diff_eq!(m.offset.y, v.y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn missing_seed_is_an_error() {
        let mut d = Diagram::new();
        let j = d.add_junction(Point2::new(0.0, 0.0));
        d.delete(crate::topology::Grabbable::Junction(j)).unwrap();
        assert!(Propagate::new(Movable::Junction(j), Vector2::new(1.0, 0.0))
            .execute(&d)
            .is_err());
    }
}
