use crate::config::EditorConfig;
use crate::error::Result;
use crate::math::vector_2d::project;
use crate::math::{Axis, Point2, Range2d, Vector2};
use crate::operations::{Propagate, ResolveSnap, SnapContext};
use crate::topology::{Diagram, Grabbable, Movable, Snapshot};

use super::{relative_body, ModifierState};

/// Dragging a junction, symbol or segment; connected parts follow by
/// propagation.
#[derive(Debug)]
pub(super) struct MoveGesture {
    seeds: Vec<Movable>,
    /// Axis used under axis lock when the grabbed element has an obvious one.
    lock_axis: Option<Axis>,
    grab_point: Point2,
    body: Option<Range2d>,
    snapshot: Snapshot,
}

impl MoveGesture {
    pub(super) fn begin(diagram: &Diagram, grabbed: Grabbable, grab_point: Point2) -> Result<Self> {
        let seeds = seeds_of(diagram, grabbed)?;
        let lock_axis = match grabbed {
            Grabbable::Segment(s) => Some(diagram.segment(s)?.axis),
            Grabbable::Junction(_) | Grabbable::Symbol(_) => match diagram.incident_axes(seeds[0])?[..] {
                [axis] => Some(axis),
                _ => None,
            },
        };
        Ok(Self {
            body: relative_body(diagram, &seeds, &grab_point),
            seeds,
            lock_axis,
            grab_point,
            snapshot: Snapshot::capture(diagram),
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
        let mut offset = pointer - self.grab_point;
        let mut snap_axis = None;
        if modifiers.axis_lock {
            let axis = self.lock_axis.unwrap_or_else(|| dominant_axis(&offset));
            offset = project(&offset, axis);
            snap_axis = Some(axis);
        }
        if !modifiers.snap_disabled {
            let mut context = SnapContext::new();
            if let Some(body) = self.body {
                context = context.with_body(body);
            }
            for &m in &self.seeds {
                context.exclude_movable(m);
            }
            let snapped = ResolveSnap::new(self.grab_point + offset, snap_axis, &context)
                .execute(diagram, config)?;
            offset = snapped.position - self.grab_point;
        }

        if modifiers.free_rotation {
            let moves: Vec<_> = self.seeds.iter().map(|&m| (m, offset)).collect();
            self.snapshot.apply(diagram, moves)?;
        } else {
            let map = Propagate::from_seeds(self.seeds.iter().map(|&m| (m, offset)).collect())
                .with_min_length(config.min_segment_length())
                .execute(diagram)?;
            self.snapshot
                .apply(diagram, map.into_iter().map(|(m, d)| (m, d.offset)))?;
        }
        Ok(())
    }

    pub(super) fn abort(self, diagram: &mut Diagram) -> Result<()> {
        Ok(self.snapshot.restore(diagram)?)
    }
}

/// Movables that follow the pointer directly.
pub(super) fn seeds_of(diagram: &Diagram, grabbed: Grabbable) -> Result<Vec<Movable>> {
    let mut seeds = match grabbed {
        Grabbable::Junction(j) => {
            diagram.junction(j)?;
            vec![Movable::Junction(j)]
        }
        Grabbable::Symbol(s) => {
            diagram.symbol(s)?;
            vec![Movable::Symbol(s)]
        }
        Grabbable::Segment(s) => {
            let seg = diagram.segment(s)?;
            vec![seg.start.owner(), seg.end.owner()]
        }
    };
    seeds.dedup();
    Ok(seeds)
}

/// Horizontal or vertical, whichever `v` leans toward.
pub(super) fn dominant_axis(v: &Vector2) -> Axis {
    if v.x.abs() >= v.y.abs() {
        Axis::HORIZONTAL
    } else {
        Axis::VERTICAL
    }
}
