use tracing::debug;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::math::{Axis, Point2, Range2d};
use crate::operations::{PushMode, ResolveSnap, SlidePlan, SlideSeed, SnapContext};
use crate::topology::{Diagram, Grabbable, Movable, Snapshot};

use super::drag::seeds_of;
use super::{relative_body, ModifierState};

/// Sliding along one axis with contact scheduling.
///
/// Schedules for both push modes are computed up front; frames only look up
/// offsets for the current slide distance.
#[derive(Debug)]
pub(super) struct SlideGesture {
    seed: SlideSeed,
    seeds: Vec<Movable>,
    axis: Axis,
    mode: PushMode,
    plan: SlidePlan,
    grab_point: Point2,
    body: Option<Range2d>,
    snapshot: Snapshot,
}

impl SlideGesture {
    pub(super) fn begin(
        diagram: &Diagram,
        config: &EditorConfig,
        axis: Axis,
        grabbed: Grabbable,
        grab_point: Point2,
        mode: PushMode,
    ) -> Result<Self> {
        let seeds = seeds_of(diagram, grabbed)?;
        let seed = match grabbed {
            Grabbable::Junction(j) => SlideSeed::Movable(Movable::Junction(j)),
            Grabbable::Symbol(s) => SlideSeed::Movable(Movable::Symbol(s)),
            Grabbable::Segment(s) => SlideSeed::Segment(s),
        };
        let plan = SlidePlan::compute(diagram, axis, seed, config.standard_gap(), None)?;
        Ok(Self {
            seed,
            body: relative_body(diagram, &seeds, &grab_point),
            seeds,
            axis,
            mode,
            plan,
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
        let unit = self.axis.unit();
        let mut distance = (pointer - self.grab_point).dot(&unit);
        if !modifiers.snap_disabled {
            let mut context = SnapContext::new();
            if let Some(body) = self.body {
                context = context.with_body(body);
            }
            for &m in &self.seeds {
                context.exclude_movable(m);
            }
            let snapped = ResolveSnap::new(self.grab_point + unit * distance, Some(self.axis), &context)
                .execute(diagram, config)?;
            distance = (snapped.position - self.grab_point).dot(&unit);
        }
        let mode = if modifiers.invert_push_mode {
            self.mode.toggled()
        } else {
            self.mode
        };
        let offsets = self.plan.schedule(mode).offsets(distance);
        self.snapshot.apply(diagram, offsets)?;
        Ok(())
    }

    /// Switches the slide axis; positions revert and both schedules are
    /// rebuilt for the new axis.
    pub(super) fn set_axis(&mut self, diagram: &mut Diagram, config: &EditorConfig, axis: Axis) -> Result<()> {
        self.snapshot.restore(diagram)?;
        self.plan = SlidePlan::compute(diagram, axis, self.seed, config.standard_gap(), None)?;
        self.axis = axis;
        debug!(?axis, "slide axis changed");
        Ok(())
    }

    pub(super) fn abort(self, diagram: &mut Diagram) -> Result<()> {
        Ok(self.snapshot.restore(diagram)?)
    }
}
