mod queue;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::{Axis, Direction, Range1d, Vector2, POSITION_TOLERANCE};
use crate::topology::{Diagram, Movable, SegmentId};

use super::extent::{movable_body, segment_body, Body};
use queue::DelayQueue;

/// Which elements a slide pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PushMode {
    /// Everything in the path is pushed to keep the standard gap.
    #[default]
    PushAll,
    /// Only elements connected through the topology follow.
    ConnectedOnly,
}

impl PushMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::PushAll => Self::ConnectedOnly,
            Self::ConnectedOnly => Self::PushAll,
        }
    }
}

/// What the user grabbed to start a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideSeed {
    Movable(Movable),
    /// Both endpoint owners move with the grab.
    Segment(SegmentId),
}

/// A movable starts following the slide once the slide distance exceeds
/// `delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideInstruction {
    pub movable: Movable,
    pub delay: f64,
}

/// Delay-ordered instructions for sliding along an axis in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSchedule {
    pub axis: Axis,
    /// Instructions for sliding along `axis.unit()`.
    pub positive: Vec<SlideInstruction>,
    /// Instructions for sliding against `axis.unit()`.
    pub negative: Vec<SlideInstruction>,
}

impl SlideSchedule {
    /// Offset of every movable that follows a slide by signed distance `s`.
    ///
    /// Each movable with `delay < |s|` moves by `|s| - delay` in the slide
    /// direction. Offsets are relative to the pre-slide positions.
    #[must_use]
    pub fn offsets(&self, s: f64) -> Vec<(Movable, Vector2)> {
        let unit = self.axis.unit();
        let (instructions, direction) = if s >= 0.0 {
            (&self.positive, unit)
        } else {
            (&self.negative, -unit)
        };
        let distance = s.abs();
        instructions
            .iter()
            .take_while(|i| i.delay < distance)
            .map(|i| (i.movable, direction * (distance - i.delay)))
            .collect()
    }

    /// Delay of `m` in the given direction, `None` if the slide never
    /// reaches it.
    #[must_use]
    pub fn delay_of(&self, m: Movable, positive: bool) -> Option<f64> {
        let list = if positive { &self.positive } else { &self.negative };
        list.iter().find(|i| i.movable == m).map(|i| i.delay)
    }
}

/// Schedules for both push modes, so the mode can flip mid-gesture without
/// recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidePlan {
    pub push_all: SlideSchedule,
    pub connected_only: SlideSchedule,
}

impl SlidePlan {
    /// Computes both schedules.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed or a traversed entity is not found.
    pub fn compute(
        diagram: &Diagram,
        axis: Axis,
        seed: SlideSeed,
        gap: f64,
        excluded: Option<SegmentId>,
    ) -> Result<Self> {
        let build = |mode| {
            let op = Schedule::new(axis, seed, mode, gap);
            match excluded {
                Some(e) => op.excluding(e).execute(diagram),
                None => op.execute(diagram),
            }
        };
        Ok(Self {
            push_all: build(PushMode::PushAll)?,
            connected_only: build(PushMode::ConnectedOnly)?,
        })
    }

    #[must_use]
    pub fn schedule(&self, mode: PushMode) -> &SlideSchedule {
        match mode {
            PushMode::PushAll => &self.push_all,
            PushMode::ConnectedOnly => &self.connected_only,
        }
    }
}

/// Contact scheduling for a slide along one axis.
///
/// Treats the diagram as a 1-D collision system and labels every reachable
/// movable with the slide distance at which it starts to move, expanding in
/// delay order like a shortest-path search. Rigid segments, and segments not
/// parallel to the slide, carry motion without delay. A parallel segment
/// being shortened lets its far end wait until it reaches the standard gap;
/// one being lengthened stretches freely. In push-all mode, anything ahead
/// whose cross extent comes within the standard gap is pushed to keep that
/// gap.
#[derive(Debug, Clone)]
pub struct Schedule {
    axis: Axis,
    seed: SlideSeed,
    mode: PushMode,
    gap: f64,
    excluded: Option<SegmentId>,
}

impl Schedule {
    #[must_use]
    pub fn new(axis: Axis, seed: SlideSeed, mode: PushMode, gap: f64) -> Self {
        Self {
            axis,
            seed,
            mode,
            gap,
            excluded: None,
        }
    }

    /// Ignores one segment (the one being drawn) in both channels.
    #[must_use]
    pub fn excluding(mut self, segment: SegmentId) -> Self {
        self.excluded = Some(segment);
        self
    }

    /// Computes the instructions for both directions.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed or a traversed entity is not found.
    pub fn execute(&self, diagram: &Diagram) -> Result<SlideSchedule> {
        let seeds = self.seeds(diagram)?;
        let forward = self.axis.direction();
        let positive = self.run(diagram, &seeds, forward)?;
        let negative = self.run(diagram, &seeds, -forward)?;
        debug!(
            mode = ?self.mode,
            positive = positive.len(),
            negative = negative.len(),
            "computed slide schedule"
        );
        Ok(SlideSchedule {
            axis: self.axis,
            positive,
            negative,
        })
    }

    fn seeds(&self, diagram: &Diagram) -> Result<Vec<Movable>, TopologyError> {
        match self.seed {
            SlideSeed::Movable(m) => {
                if diagram.contains(m) {
                    Ok(vec![m])
                } else {
                    Err(TopologyError::EntityNotFound("movable"))
                }
            }
            SlideSeed::Segment(s) => {
                let seg = diagram.segment(s)?;
                let mut owners = vec![seg.start.owner(), seg.end.owner()];
                owners.dedup();
                Ok(owners)
            }
        }
    }

    fn run(
        &self,
        diagram: &Diagram,
        seeds: &[Movable],
        direction: Direction,
    ) -> Result<Vec<SlideInstruction>, TopologyError> {
        let field = match self.mode {
            PushMode::PushAll => Some(ContactField::build(diagram, self, direction)?),
            PushMode::ConnectedOnly => None,
        };

        let mut queue = DelayQueue::new();
        for &m in seeds {
            queue.offer(m, 0.0);
        }
        let mut out = Vec::new();
        while let Some((m, delay)) = queue.pop() {
            out.push(SlideInstruction { movable: m, delay });
            self.relax_connected(diagram, &mut queue, m, delay, direction)?;
            if let Some(field) = &field {
                field.relax_in_path(&mut queue, m, delay, self.gap);
            }
        }
        Ok(out)
    }

    fn relax_connected(
        &self,
        diagram: &Diagram,
        queue: &mut DelayQueue,
        m: Movable,
        delay: f64,
        direction: Direction,
    ) -> Result<(), TopologyError> {
        for e in diagram.movable_edges(m)? {
            if Some(e) == self.excluded {
                continue;
            }
            let seg = diagram.segment(e)?;
            let (near, far) = if seg.start.owner() == m {
                (seg.start, seg.end)
            } else {
                (seg.end, seg.start)
            };
            let neighbor = far.owner();
            if neighbor == m || queue.is_final(neighbor) {
                continue;
            }
            if seg.is_rigid || seg.axis != self.axis {
                queue.offer(neighbor, delay);
                continue;
            }
            let ahead = direction.component(
                &(diagram.vertex_position(far)? - diagram.vertex_position(near)?),
            );
            if ahead > POSITION_TOLERANCE {
                queue.offer(neighbor, delay + (ahead - self.gap).max(0.0));
            }
        }
        Ok(())
    }
}

/// Projected extents of every body, for push-in-path tests.
struct ContactField {
    bodies: Vec<(Body, Range1d, Range1d)>,
    /// Bodies that lead each movable: its own, plus its segments that
    /// cross the slide axis.
    leading: HashMap<Movable, Vec<usize>>,
}

impl ContactField {
    fn build(
        diagram: &Diagram,
        schedule: &Schedule,
        direction: Direction,
    ) -> Result<Self, TopologyError> {
        let across = direction.perpendicular();
        let half_gap = 0.5 * schedule.gap;
        let mut field = Self {
            bodies: Vec::new(),
            leading: HashMap::new(),
        };
        let mut push = |body: Body| {
            let slide = body.extent(direction);
            let cross = body.extent(across).padded(half_gap);
            for owner in &body.owners {
                field
                    .leading
                    .entry(*owner)
                    .or_default()
                    .push(field.bodies.len());
            }
            field.bodies.push((body, slide, cross));
        };
        for m in diagram.movables() {
            push(movable_body(diagram, m)?);
        }
        for (s, seg) in diagram.segments() {
            if Some(s) == schedule.excluded || seg.axis == schedule.axis {
                continue;
            }
            push(segment_body(diagram, s)?);
        }
        Ok(field)
    }

    fn relax_in_path(&self, queue: &mut DelayQueue, m: Movable, delay: f64, gap: f64) {
        let Some(leading) = self.leading.get(&m) else {
            return;
        };
        for &i in leading {
            let (_, slide, cross) = &self.bodies[i];
            for (other, other_slide, other_cross) in &self.bodies {
                if other.is_owned_by(m) || !cross.overlaps(other_cross) {
                    continue;
                }
                let ahead = other_slide.min > slide.min + POSITION_TOLERANCE
                    && other_slide.min >= slide.max - POSITION_TOLERANCE;
                if !ahead {
                    continue;
                }
                let proposal = delay + (slide.gap_to(other_slide) - gap).max(0.0);
                for owner in &other.owners {
                    queue.offer(*owner, proposal);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::{Point2, Range2d, Rotation};
    use crate::topology::{JunctionId, PortId, SymbolKind, Vertex};

    fn junction(d: &mut Diagram, x: f64, y: f64) -> JunctionId {
        d.add_junction(Point2::new(x, y))
    }

    fn link(d: &mut Diagram, a: JunctionId, b: JunctionId, rigid: bool) -> SegmentId {
        d.connect(Vertex::Junction(a), Vertex::Junction(b), rigid)
            .unwrap()
    }

    fn schedule(d: &Diagram, seed: JunctionId, mode: PushMode) -> SlideSchedule {
        Schedule::new(
            Axis::HORIZONTAL,
            SlideSeed::Movable(Movable::Junction(seed)),
            mode,
            30.0,
        )
        .execute(d)
        .unwrap()
    }

    #[test]
    fn element_at_standard_gap_is_pushed_immediately() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 30.0, 0.0);
        let s = schedule(&d, a, PushMode::PushAll);
        assert_abs_diff_eq!(s.delay_of(Movable::Junction(b), true).unwrap(), 0.0);
        assert!(s.delay_of(Movable::Junction(b), false).is_none());

        let offsets: HashMap<_, _> = s.offsets(50.0).into_iter().collect();
        assert_abs_diff_eq!(offsets[&Movable::Junction(b)].x, 50.0);
    }

    #[test]
    fn distant_element_waits_for_the_gap() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 100.0, 10.0);
        let s = schedule(&d, a, PushMode::PushAll);
        assert_abs_diff_eq!(s.delay_of(Movable::Junction(b), true).unwrap(), 70.0);
        assert!(s.offsets(60.0).iter().all(|(m, _)| *m != Movable::Junction(b)));
        let offsets: HashMap<_, _> = s.offsets(80.0).into_iter().collect();
        assert_abs_diff_eq!(offsets[&Movable::Junction(b)].x, 10.0);
    }

    #[test]
    fn elements_outside_cross_extent_are_ignored() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 50.0, 40.0);
        let s = schedule(&d, a, PushMode::PushAll);
        assert!(s.delay_of(Movable::Junction(b), true).is_none());
    }

    #[test]
    fn connected_only_ignores_unconnected() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 30.0, 0.0);
        let s = schedule(&d, a, PushMode::ConnectedOnly);
        assert_eq!(s.positive.len(), 1);
        assert!(s.offsets(10.0).iter().all(|(m, _)| *m == Movable::Junction(a)));
        let _ = b;
    }

    #[test]
    fn contracting_wire_delays_far_end() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 100.0, 0.0);
        link(&mut d, a, b, false);
        let s = schedule(&d, a, PushMode::ConnectedOnly);
        assert_abs_diff_eq!(s.delay_of(Movable::Junction(b), true).unwrap(), 70.0);
        // Sliding away stretches the wire.
        assert!(s.delay_of(Movable::Junction(b), false).is_none());
    }

    #[test]
    fn crossing_wire_and_rigid_wire_follow_immediately() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let up = junction(&mut d, 0.0, -50.0);
        let right = junction(&mut d, 100.0, 0.0);
        link(&mut d, a, up, false);
        link(&mut d, a, right, true);
        let s = schedule(&d, a, PushMode::ConnectedOnly);
        for m in [up, right] {
            assert_abs_diff_eq!(s.delay_of(Movable::Junction(m), true).unwrap(), 0.0);
            assert_abs_diff_eq!(s.delay_of(Movable::Junction(m), false).unwrap(), 0.0);
        }
    }

    #[test]
    fn vertical_wire_pushes_symbol_ahead() {
        let mut d = Diagram::new();
        let top = junction(&mut d, 0.0, -40.0);
        let bottom = junction(&mut d, 0.0, 40.0);
        link(&mut d, top, bottom, false);
        let kind = Arc::new(SymbolKind::new(
            "block",
            Range2d::new(Range1d::new(-10.0, 10.0), Range1d::new(-10.0, 10.0)),
            vec![],
        ));
        let sym = d.spawn_symbol(kind, Point2::new(60.0, 30.0), Rotation::IDENTITY);
        let s = schedule(&d, top, PushMode::PushAll);
        // The wire spans y ∈ [-40, 40]; the symbol's near face is at x = 50.
        assert_abs_diff_eq!(s.delay_of(Movable::Symbol(sym), true).unwrap(), 20.0);
        assert_abs_diff_eq!(s.delay_of(Movable::Junction(bottom), true).unwrap(), 0.0);
    }

    #[test]
    fn segment_seed_moves_both_ends() {
        let mut d = Diagram::new();
        let kind = Arc::new(SymbolKind::new(
            "pin",
            Range2d::new(Range1d::new(-5.0, 5.0), Range1d::new(-5.0, 5.0)),
            vec![Vector2::new(0.0, 5.0)],
        ));
        let sym = d.spawn_symbol(kind, Point2::new(0.0, 0.0), Rotation::IDENTITY);
        let j = junction(&mut d, 0.0, 60.0);
        let wire = d
            .connect(Vertex::Port(PortId::new(sym, 0)), Vertex::Junction(j), false)
            .unwrap();
        let s = Schedule::new(
            Axis::HORIZONTAL,
            SlideSeed::Segment(wire),
            PushMode::ConnectedOnly,
            30.0,
        )
        .execute(&d)
        .unwrap();
        assert_eq!(s.positive.len(), 2);
        assert!(s.positive.iter().all(|i| i.delay == 0.0));
    }

    #[test]
    fn plan_switches_mode_without_recompute() {
        let mut d = Diagram::new();
        let a = junction(&mut d, 0.0, 0.0);
        let b = junction(&mut d, 40.0, 0.0);
        let plan = SlidePlan::compute(
            &d,
            Axis::HORIZONTAL,
            SlideSeed::Movable(Movable::Junction(a)),
            30.0,
            None,
        )
        .unwrap();
        assert!(plan
            .schedule(PushMode::PushAll)
            .delay_of(Movable::Junction(b), true)
            .is_some());
        assert!(plan
            .schedule(PushMode::ConnectedOnly)
            .delay_of(Movable::Junction(b), true)
            .is_none());
    }
}
