use tracing::{debug, trace};

use crate::config::EditorConfig;
use crate::error::{Result, TopologyError};
use crate::math::vector_2d::project;
use crate::math::{Axis, Point2};
use crate::operations::{PropagateFromDrawnSegment, ResolveSnap, SnapContext, SnapResult, SnapTarget};
use crate::topology::{
    Diagram, Grabbable, JunctionGlyph, JunctionId, Movable, NewSegment, SegmentId, Snapshot, Vertex,
};

use super::{GestureOutcome, ModifierState, RejectReason};

/// A start junction that only exists because of this draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CreatedStart {
    /// Placed on empty canvas.
    Fresh(JunctionId),
    /// Inserted into an existing segment.
    Split(JunctionId),
}

/// Drawing a new segment out of a vertex.
///
/// The free end is a speculative junction connected to the start from the
/// first frame on. Committing keeps it, re-terminates it onto a snapped
/// vertex, or splits a snapped segment with it.
#[derive(Debug)]
pub(super) struct DrawGesture {
    start: Vertex,
    end: JunctionId,
    segment: SegmentId,
    origin: Point2,
    created_start: Option<CreatedStart>,
    start_glyph: Option<(JunctionId, JunctionGlyph)>,
    snapshot: Snapshot,
    last_snap: Option<SnapResult>,
}

impl DrawGesture {
    pub(super) fn begin(
        diagram: &mut Diagram,
        start: Vertex,
        axis: Axis,
        created_start: Option<CreatedStart>,
    ) -> Result<Self> {
        let origin = diagram.vertex_position(start)?;
        if let Vertex::Port(p) = start {
            if diagram.port(p)?.edge.is_some() {
                return Err(TopologyError::PortOccupied.into());
            }
        }
        let start_glyph = match start {
            Vertex::Junction(j) => Some((j, diagram.junction(j)?.glyph)),
            Vertex::Port(_) => None,
        };
        let end = diagram.add_junction(origin);
        let segment = diagram.connect_along(start, Vertex::Junction(end), axis, false)?;
        Ok(Self {
            start,
            end,
            segment,
            origin,
            created_start,
            start_glyph,
            snapshot: Snapshot::capture(diagram),
            last_snap: None,
        })
    }

    pub(super) fn update(
        &mut self,
        diagram: &mut Diagram,
        config: &EditorConfig,
        pointer: Point2,
        modifiers: ModifierState,
    ) -> Result<()> {
        self.snapshot.restore(diagram)?;
        let axis = diagram.segment(self.segment)?.axis;
        let end = Movable::Junction(self.end);

        let (candidate, snap_axis) = if modifiers.free_rotation {
            (pointer, None)
        } else if modifiers.axis_lock {
            (self.origin + project(&(pointer - self.origin), axis), Some(axis))
        } else {
            (pointer, None)
        };

        self.last_snap = None;
        let target = if modifiers.snap_disabled {
            candidate
        } else {
            let mut context = SnapContext::new().attaching();
            if modifiers.free_rotation {
                context = context.with_origin(self.origin);
            }
            context.exclude_vertex(Vertex::Junction(self.end));
            context.exclude_vertex(self.start);
            context.exclude_segment(self.segment);
            let snapped = ResolveSnap::new(candidate, snap_axis, &context).execute(diagram, config)?;
            let position = snapped.position;
            self.last_snap = Some(snapped);
            position
        };

        let offset = target - self.origin;
        if modifiers.free_rotation || modifiers.axis_lock {
            self.snapshot.apply(diagram, [(end, offset)])?;
        } else {
            let map = PropagateFromDrawnSegment::new(self.segment, offset)
                .with_min_length(config.min_segment_length())
                .execute(diagram)?;
            self.snapshot
                .apply(diagram, map.into_iter().map(|(m, d)| (m, d.offset)))?;
        }
        trace!(x = target.x, y = target.y, "draw frame");
        Ok(())
    }

    pub(super) fn end(self, diagram: &mut Diagram, config: &EditorConfig) -> Result<GestureOutcome> {
        if let Some(reason) = self.rejection(diagram, config)? {
            debug!(?reason, "discarding drawn segment");
            self.discard(diagram)?;
            return Ok(GestureOutcome::Discarded(reason));
        }

        let mut attached = None;
        match self.last_snap.as_ref().filter(|s| s.exact).and_then(SnapResult::target) {
            Some(SnapTarget::Vertex(v)) if diagram.vertex_position(*v).is_ok() => {
                diagram.replace_with(self.segment, &[NewSegment::new(self.start, *v, false)])?;
                diagram.delete(Grabbable::Junction(self.end))?;
                attached = v.as_junction();
            }
            Some(SnapTarget::Segment { segment, .. }) if diagram.segment(*segment).is_ok() => {
                diagram.split_at(*segment, self.end)?;
            }
            _ => {}
        }

        let touched = [self.start.as_junction(), Some(self.end), attached];
        for j in touched.into_iter().flatten() {
            if diagram.junction(j).is_ok() {
                diagram.refresh_glyph(j)?;
            }
        }
        Ok(GestureOutcome::Committed)
    }

    pub(super) fn abort(self, diagram: &mut Diagram) -> Result<()> {
        self.discard(diagram)
    }

    fn rejection(&self, diagram: &Diagram, config: &EditorConfig) -> Result<Option<RejectReason>> {
        let (a, b) = diagram.endpoints(self.segment)?;
        let drawn = b - a;
        if drawn.norm() < config.min_segment_length() {
            return Ok(Some(RejectReason::TooShort));
        }
        let axis = diagram.segment(self.segment)?.axis;
        for e in diagram.vertex_edges(self.start)? {
            if e == self.segment {
                continue;
            }
            let other = diagram.segment(e)?;
            if other.axis != axis {
                continue;
            }
            let Some(far) = other.other_end(self.start) else {
                continue;
            };
            if (diagram.vertex_position(far)? - a).dot(&drawn) > 0.0 {
                return Ok(Some(RejectReason::OverlapsCollinear));
            }
        }
        Ok(None)
    }

    /// Reverts positions and removes everything the draw created.
    fn discard(self, diagram: &mut Diagram) -> Result<()> {
        self.snapshot.restore(diagram)?;
        diagram.delete(Grabbable::Junction(self.end))?;
        match self.created_start {
            Some(CreatedStart::Fresh(j)) => {
                diagram.delete(Grabbable::Junction(j))?;
            }
            Some(CreatedStart::Split(j)) => {
                diagram.rejoin_split(j)?;
            }
            None => {
                if let Some((j, glyph)) = self.start_glyph {
                    if diagram.junction(j)?.glyph != glyph {
                        diagram.toggle_glyph(j)?;
                    }
                }
            }
        }
        Ok(())
    }
}
