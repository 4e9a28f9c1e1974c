mod drag;
mod draw;
mod modifiers;
mod slide;
mod warp;

pub use modifiers::ModifierState;

use std::sync::Arc;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::EditorConfig;
use crate::error::{OperationError, Result};
use crate::math::{Axis, Point2, Range2d, Rotation};
use crate::operations::PushMode;
use crate::topology::{
    Diagram, Grabbable, JunctionGlyph, JunctionId, Movable, Pick, SymbolId, SymbolKind, Vertex,
};

use drag::MoveGesture;
use draw::DrawGesture;
use slide::SlideGesture;
use warp::WarpGesture;

slotmap::new_key_type! {
    /// Opaque handle to a gesture in progress.
    pub struct OperationId;
}

/// Why a finished draw left the diagram unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The drawn segment is shorter than the configured minimum.
    TooShort,
    /// The drawn segment would lie on top of a collinear segment leaving the
    /// same vertex.
    OverlapsCollinear,
}

/// Result of ending a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Committed,
    /// The speculative geometry was removed.
    Discarded(RejectReason),
}

#[derive(Debug)]
enum Operation {
    Draw(DrawGesture),
    Move(MoveGesture),
    Slide(SlideGesture),
    Warp(WarpGesture),
}

/// Interactive front end over a [`Diagram`].
///
/// The UI layer decides what the user is doing and drives one gesture at a
/// time through `begin_*`, [`Editor::update`] on every pointer move, and
/// [`Editor::end`] or [`Editor::abort`]. Each update recomputes the frame
/// from the positions captured when the gesture began.
#[derive(Debug, Default)]
pub struct Editor {
    diagram: Diagram,
    config: EditorConfig,
    operations: SlotMap<OperationId, Operation>,
}

impl Editor {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_diagram(Diagram::new(), config)
    }

    /// Wraps an existing diagram.
    #[must_use]
    pub fn with_diagram(diagram: Diagram, config: EditorConfig) -> Self {
        Self {
            diagram,
            config,
            operations: SlotMap::with_key(),
        }
    }

    #[must_use]
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Direct access for building diagrams outside of gestures.
    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut self.diagram
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Returns whether `id` names a gesture still in progress.
    #[must_use]
    pub fn is_active(&self, id: OperationId) -> bool {
        self.operations.contains_key(id)
    }

    /// Starts drawing a segment out of `from` along `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if a gesture is already running, the vertex is
    /// missing, or it is a port that already carries a segment.
    pub fn begin_draw(&mut self, from: Vertex, axis: Axis) -> Result<OperationId> {
        self.ensure_idle()?;
        let gesture = DrawGesture::begin(&mut self.diagram, from, axis, None)?;
        Ok(self.register(Operation::Draw(gesture)))
    }

    /// Starts drawing at a pointer position.
    ///
    /// Starts from the vertex under the pointer, or splits the segment under
    /// it, or creates a fresh junction.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::OnCrossing`] if the pointer is on a
    /// crossing, or an error if a gesture is already running.
    pub fn begin_draw_at(&mut self, point: Point2, axis: Axis) -> Result<OperationId> {
        self.ensure_idle()?;
        let pick = self.diagram.pick(
            &point,
            self.config.interaction_radius(),
            self.config.crossing_clearance(),
        );
        let gesture = match pick {
            Some(Pick::Vertex(v)) => DrawGesture::begin(&mut self.diagram, v, axis, None)?,
            Some(Pick::Crossing(_)) => return Err(OperationError::OnCrossing.into()),
            Some(Pick::Segment { segment, point }) => {
                let j = self.diagram.add_junction(point);
                self.diagram.split_at(segment, j)?;
                DrawGesture::begin(
                    &mut self.diagram,
                    Vertex::Junction(j),
                    axis,
                    Some(draw::CreatedStart::Split(j)),
                )?
            }
            None => {
                let j = self.diagram.add_junction(point);
                DrawGesture::begin(
                    &mut self.diagram,
                    Vertex::Junction(j),
                    axis,
                    Some(draw::CreatedStart::Fresh(j)),
                )?
            }
        };
        Ok(self.register(Operation::Draw(gesture)))
    }

    /// Starts dragging a junction, symbol or segment.
    ///
    /// # Errors
    ///
    /// Returns an error if a gesture is already running or the element is
    /// missing.
    pub fn begin_move(&mut self, grabbed: Grabbable, grab_point: Point2) -> Result<OperationId> {
        self.ensure_idle()?;
        let gesture = MoveGesture::begin(&self.diagram, grabbed, grab_point)?;
        Ok(self.register(Operation::Move(gesture)))
    }

    /// Starts sliding an element along `axis`, pushing others out of the way.
    ///
    /// # Errors
    ///
    /// Returns an error if a gesture is already running or the element is
    /// missing.
    pub fn begin_slide(
        &mut self,
        axis: Axis,
        grabbed: Grabbable,
        grab_point: Point2,
        mode: PushMode,
    ) -> Result<OperationId> {
        self.ensure_idle()?;
        let gesture = SlideGesture::begin(&self.diagram, &self.config, axis, grabbed, grab_point, mode)?;
        Ok(self.register(Operation::Slide(gesture)))
    }

    /// Starts translating a selection rigidly by the pointer offset from
    /// `anchor`.
    ///
    /// # Errors
    ///
    /// Returns an error if a gesture is already running, the selection is
    /// empty, or a movable is missing.
    pub fn begin_warp(&mut self, movables: Vec<Movable>, anchor: Point2) -> Result<OperationId> {
        self.ensure_idle()?;
        let gesture = WarpGesture::begin(&self.diagram, movables, anchor)?;
        Ok(self.register(Operation::Warp(gesture)))
    }

    /// Advances a gesture to the current pointer position.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownOperation`] for a stale handle, or an
    /// error if the diagram changed underneath the gesture.
    pub fn update(&mut self, id: OperationId, pointer: Point2, modifiers: ModifierState) -> Result<()> {
        let op = self
            .operations
            .get_mut(id)
            .ok_or(OperationError::UnknownOperation)?;
        trace!(?id, x = pointer.x, y = pointer.y, ?modifiers, "update gesture");
        let (diagram, config) = (&mut self.diagram, &self.config);
        match op {
            Operation::Draw(g) => g.update(diagram, config, pointer, modifiers),
            Operation::Move(g) => g.update(diagram, config, pointer, modifiers),
            Operation::Slide(g) => g.update(diagram, config, pointer, modifiers),
            Operation::Warp(g) => g.update(diagram, config, pointer, modifiers),
        }
    }

    /// Rebuilds a slide's schedules for a new axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a slide in progress.
    pub fn set_slide_axis(&mut self, id: OperationId, axis: Axis) -> Result<()> {
        match self.operations.get_mut(id) {
            Some(Operation::Slide(g)) => g.set_axis(&mut self.diagram, &self.config, axis),
            Some(_) => Err(OperationError::InvalidInput("not a slide gesture".to_owned()).into()),
            None => Err(OperationError::UnknownOperation.into()),
        }
    }

    /// Finishes a gesture, committing or discarding its result.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownOperation`] for a stale handle.
    pub fn end(&mut self, id: OperationId) -> Result<GestureOutcome> {
        let op = self
            .operations
            .remove(id)
            .ok_or(OperationError::UnknownOperation)?;
        let outcome = match op {
            Operation::Draw(g) => g.end(&mut self.diagram, &self.config)?,
            Operation::Move(_) | Operation::Slide(_) | Operation::Warp(_) => GestureOutcome::Committed,
        };
        debug!(?id, ?outcome, "ended gesture");
        Ok(outcome)
    }

    /// Cancels a gesture: every movable returns to where it was when the
    /// gesture began and speculative geometry is removed.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownOperation`] for a stale handle.
    pub fn abort(&mut self, id: OperationId) -> Result<()> {
        let op = self
            .operations
            .remove(id)
            .ok_or(OperationError::UnknownOperation)?;
        match op {
            Operation::Draw(g) => g.abort(&mut self.diagram)?,
            Operation::Move(g) => g.abort(&mut self.diagram)?,
            Operation::Slide(g) => g.abort(&mut self.diagram)?,
            Operation::Warp(g) => g.abort(&mut self.diagram)?,
        }
        debug!(?id, "aborted gesture");
        Ok(())
    }

    /// Flips the glyph of the junction under the pointer.
    ///
    /// Returns the new glyph, or `None` if no junction is there.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::OnCrossing`] if the pointer is on a crossing.
    pub fn toggle_glyph_at(&mut self, point: Point2) -> Result<Option<JunctionGlyph>> {
        let pick = self.diagram.pick(
            &point,
            self.config.interaction_radius(),
            self.config.crossing_clearance(),
        );
        match pick {
            Some(Pick::Vertex(Vertex::Junction(j))) => Ok(Some(self.diagram.toggle_glyph(j)?)),
            Some(Pick::Crossing(_)) => Err(OperationError::OnCrossing.into()),
            _ => Ok(None),
        }
    }

    /// Deletes an element; see [`Diagram::delete`].
    ///
    /// # Errors
    ///
    /// Returns an error if a gesture is running or the element is missing.
    pub fn delete(&mut self, target: Grabbable) -> Result<Vec<JunctionId>> {
        self.ensure_idle()?;
        self.diagram.delete(target)
    }

    /// Places a symbol from the catalog.
    pub fn spawn_symbol(&mut self, kind: Arc<SymbolKind>, position: Point2, rotation: Rotation) -> SymbolId {
        let id = self.diagram.spawn_symbol(kind, position, rotation);
        debug!(?id, "spawned symbol");
        id
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.operations.is_empty() {
            Ok(())
        } else {
            Err(OperationError::InvalidInput("another gesture is in progress".to_owned()).into())
        }
    }

    fn register(&mut self, op: Operation) -> OperationId {
        let kind = match &op {
            Operation::Draw(_) => "draw",
            Operation::Move(_) => "move",
            Operation::Slide(_) => "slide",
            Operation::Warp(_) => "warp",
        };
        let id = self.operations.insert(op);
        debug!(?id, kind, "began gesture");
        id
    }
}

/// Union of the bodies of `movables`, relative to `anchor`.
fn relative_body(diagram: &Diagram, movables: &[Movable], anchor: &Point2) -> Option<Range2d> {
    movables
        .iter()
        .filter_map(|m| diagram.body(*m).ok())
        .reduce(|a, b| a.union(&b))
        .map(|b| b.translated(&-anchor.coords))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SchematicError;
    use crate::math::{Range1d, Vector2};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut editor = Editor::default();
        let j = editor.diagram_mut().add_junction(p(0.0, 0.0));
        let id = editor.begin_move(Grabbable::Junction(j), p(0.0, 0.0)).unwrap();
        assert!(editor.is_active(id));
        editor.end(id).unwrap();
        assert!(!editor.is_active(id));
        assert!(matches!(
            editor.update(id, p(1.0, 1.0), ModifierState::default()),
            Err(SchematicError::Operation(OperationError::UnknownOperation))
        ));
        assert!(editor.end(id).is_err());
    }

    #[test]
    fn one_gesture_at_a_time() {
        let mut editor = Editor::default();
        let j = editor.diagram_mut().add_junction(p(0.0, 0.0));
        let _id = editor.begin_move(Grabbable::Junction(j), p(0.0, 0.0)).unwrap();
        assert!(editor.begin_warp(vec![Movable::Junction(j)], p(0.0, 0.0)).is_err());
        assert!(editor.delete(Grabbable::Junction(j)).is_err());
    }

    #[test]
    fn draw_on_crossing_is_refused() {
        let mut editor = Editor::default();
        let d = editor.diagram_mut();
        let a = d.add_junction(p(0.0, 0.0));
        let b = d.add_junction(p(100.0, 0.0));
        let c = d.add_junction(p(50.0, -50.0));
        let e = d.add_junction(p(50.0, 50.0));
        d.connect(Vertex::Junction(a), Vertex::Junction(b), false).unwrap();
        d.connect(Vertex::Junction(c), Vertex::Junction(e), false).unwrap();
        let before = editor.diagram().version();
        assert!(matches!(
            editor.begin_draw_at(p(51.0, 1.0), Axis::VERTICAL),
            Err(SchematicError::Operation(OperationError::OnCrossing))
        ));
        assert!(matches!(
            editor.toggle_glyph_at(p(50.0, 0.0)),
            Err(SchematicError::Operation(OperationError::OnCrossing))
        ));
        assert_eq!(editor.diagram().version(), before);
    }

    #[test]
    fn toggle_glyph_under_pointer() {
        let mut editor = Editor::default();
        let j = editor.diagram_mut().add_junction(p(10.0, 10.0));
        assert_eq!(
            editor.toggle_glyph_at(p(12.0, 10.0)).unwrap(),
            Some(JunctionGlyph::Plug)
        );
        assert_eq!(editor.diagram().junction(j).unwrap().glyph, JunctionGlyph::Plug);
        assert_eq!(editor.toggle_glyph_at(p(80.0, 80.0)).unwrap(), None);
    }

    #[test]
    fn spawned_symbol_is_visible() {
        let mut editor = Editor::default();
        let kind = Arc::new(SymbolKind::new(
            "gate",
            Range2d::new(Range1d::new(-10.0, 10.0), Range1d::new(-10.0, 10.0)),
            vec![Vector2::new(-10.0, 0.0)],
        ));
        let id = editor.spawn_symbol(kind, p(0.0, 0.0), Rotation::IDENTITY);
        assert_eq!(editor.diagram().symbols().count(), 1);
        assert_eq!(editor.diagram().ports().count(), 1);
        assert!(editor.diagram().symbol(id).is_ok());
    }

    #[test]
    fn relative_body_spans_selection() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(10.0, 0.0));
        let b = d.add_junction(p(30.0, 20.0));
        let body = relative_body(
            &d,
            &[Movable::Junction(a), Movable::Junction(b)],
            &p(10.0, 0.0),
        )
        .unwrap();
        assert_eq!(body, Range2d::from_corners(&p(0.0, 0.0), &p(20.0, 20.0)));
    }
}
