use crate::config::EditorConfig;
use crate::error::{OperationError, Result};
use crate::math::vector_2d::project;
use crate::math::{Point2, Range2d};
use crate::operations::{ResolveSnap, SnapContext};
use crate::topology::{Diagram, Movable, Snapshot};

use super::drag::dominant_axis;
use super::{relative_body, ModifierState};

/// Rigid translation of a selection. Segments leading out of the selection
/// stretch and reorient; nothing outside it moves.
///
/// `anchor` is the point the pointer offset is measured from. The selection
/// never rotates about it.
#[derive(Debug)]
pub(super) struct WarpGesture {
    movables: Vec<Movable>,
    anchor: Point2,
    body: Option<Range2d>,
    snapshot: Snapshot,
}

impl WarpGesture {
    pub(super) fn begin(diagram: &Diagram, mut movables: Vec<Movable>, anchor: Point2) -> Result<Self> {
        if movables.is_empty() {
            return Err(OperationError::InvalidInput("empty selection".to_owned()).into());
        }
        for &m in &movables {
            diagram.movable_position(m)?;
        }
        movables.sort_unstable();
        movables.dedup();
        Ok(Self {
            body: relative_body(diagram, &movables, &anchor),
            movables,
            anchor,
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
        let mut offset = pointer - self.anchor;
        let mut snap_axis = None;
        if modifiers.axis_lock {
            let axis = dominant_axis(&offset);
            offset = project(&offset, axis);
            snap_axis = Some(axis);
        }
        if !modifiers.snap_disabled {
            let mut context = SnapContext::new();
            if let Some(body) = self.body {
                context = context.with_body(body);
            }
            for &m in &self.movables {
                context.exclude_movable(m);
            }
            let snapped = ResolveSnap::new(self.anchor + offset, snap_axis, &context)
                .execute(diagram, config)?;
            offset = snapped.position - self.anchor;
        }
        let moves: Vec<_> = self.movables.iter().map(|&m| (m, offset)).collect();
        self.snapshot.apply(diagram, moves)?;
        Ok(())
    }

    pub(super) fn abort(self, diagram: &mut Diagram) -> Result<()> {
        Ok(self.snapshot.restore(diagram)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Axis;
    use crate::topology::Vertex;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn selection_moves_rigidly_and_outgoing_edges_reorient() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let b = d.add_junction(p(50.0, 0.0));
        let outside = d.add_junction(p(100.0, 0.0));
        let inner = d
            .connect(Vertex::Junction(a), Vertex::Junction(b), false)
            .unwrap();
        let outer = d
            .connect(Vertex::Junction(b), Vertex::Junction(outside), false)
            .unwrap();
        let config = EditorConfig::default();
        let mut g = WarpGesture::begin(
            &d,
            vec![Movable::Junction(a), Movable::Junction(b)],
            p(25.0, 0.0),
        )
        .unwrap();
        g.update(&mut d, &config, p(25.0, -50.0), ModifierState::default().without_snapping())
            .unwrap();
        assert_eq!(d.junction(a).unwrap().position, p(0.0, -50.0));
        assert_eq!(d.junction(b).unwrap().position, p(50.0, -50.0));
        assert_eq!(d.junction(outside).unwrap().position, p(100.0, 0.0));
        assert_eq!(d.segment(inner).unwrap().axis, Axis::HORIZONTAL);
        assert_eq!(d.segment(outer).unwrap().axis, Axis::DIAGONAL);
    }

    #[test]
    fn anchor_away_from_selection_only_translates() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let b = d.add_junction(p(40.0, 0.0));
        d.connect(Vertex::Junction(a), Vertex::Junction(b), false)
            .unwrap();
        let config = EditorConfig::default();
        let mut g = WarpGesture::begin(
            &d,
            vec![Movable::Junction(a), Movable::Junction(b)],
            p(200.0, 200.0),
        )
        .unwrap();
        g.update(&mut d, &config, p(230.0, 190.0), ModifierState::default().without_snapping())
            .unwrap();
        assert_eq!(d.junction(a).unwrap().position, p(30.0, -10.0));
        assert_eq!(d.junction(b).unwrap().position, p(70.0, -10.0));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let d = Diagram::new();
        assert!(WarpGesture::begin(&d, Vec::new(), p(0.0, 0.0)).is_err());
    }
}
