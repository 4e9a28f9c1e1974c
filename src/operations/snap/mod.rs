mod gap;
mod point;

use std::collections::HashSet;

use tracing::trace;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::math::vector_2d::project;
use crate::math::{Axis, Easing, Point2, Range2d, TOLERANCE};
use crate::topology::{Diagram, Movable, SegmentId, Vertex};

use super::extent::BodyKind;

/// What a candidate position was pulled toward.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapTarget {
    /// An attachable junction or free port.
    Vertex(Vertex),
    /// The nearest point on a segment.
    Segment { segment: SegmentId, point: Point2 },
    /// A standard axis through the origin of the line being drawn.
    StandardAxis(Axis),
    /// Standard-gap spacing from another element along `axis`.
    StandardGap { axis: Axis, body: BodyKind },
}

/// What the resolver may snap to, and what it must ignore.
#[derive(Debug, Clone, Default)]
pub struct SnapContext {
    excluded_vertices: HashSet<Vertex>,
    excluded_segments: HashSet<SegmentId>,
    excluded_movables: HashSet<Movable>,
    body: Option<Range2d>,
    attach: bool,
    origin: Option<Point2>,
}

impl SnapContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables snapping onto vertices and segments.
    #[must_use]
    pub fn attaching(mut self) -> Self {
        self.attach = true;
        self
    }

    /// Start of the line being drawn; enables easing toward standard axes.
    #[must_use]
    pub fn with_origin(mut self, origin: Point2) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Extent of the moving element relative to the candidate position.
    /// Without one the candidate is treated as a point.
    #[must_use]
    pub fn with_body(mut self, body: Range2d) -> Self {
        self.body = Some(body);
        self
    }

    pub fn exclude_vertex(&mut self, v: Vertex) {
        self.excluded_vertices.insert(v);
    }

    pub fn exclude_segment(&mut self, s: SegmentId) {
        self.excluded_segments.insert(s);
    }

    /// Excludes a movable, its ports and every segment attached to it.
    pub fn exclude_movable(&mut self, m: Movable) {
        self.excluded_movables.insert(m);
    }

    fn excludes_vertex(&self, v: Vertex) -> bool {
        self.excluded_vertices.contains(&v) || self.excluded_movables.contains(&v.owner())
    }

    fn excludes_movable(&self, m: Movable) -> bool {
        self.excluded_movables.contains(&m)
    }

    fn excludes_segment(&self, diagram: &Diagram, s: SegmentId) -> bool {
        if self.excluded_segments.contains(&s) {
            return true;
        }
        diagram.segment(s).map_or(true, |seg| {
            self.excluded_movables.contains(&seg.start.owner())
                || self.excluded_movables.contains(&seg.end.owner())
        })
    }
}

/// Outcome of snap resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Where the candidate ends up.
    pub position: Point2,
    /// Targets that were applied, most important first.
    pub targets: Vec<SnapTarget>,
    /// Equally close alternatives that were not applied.
    pub ties: Vec<SnapTarget>,
    /// Whether every applied target was reached exactly.
    pub exact: bool,
}

impl SnapResult {
    fn unchanged(position: Point2) -> Self {
        Self {
            position,
            targets: Vec::new(),
            ties: Vec::new(),
            exact: false,
        }
    }

    /// The primary applied target.
    #[must_use]
    pub fn target(&self) -> Option<&SnapTarget> {
        self.targets.first()
    }
}

/// A possible snap: where it would put the candidate and how far that is.
#[derive(Debug, Clone)]
struct Candidate {
    target: SnapTarget,
    point: Point2,
    distance: f64,
    /// Lower ranks win among near-equal distances.
    rank: u8,
}

/// Picks the closest candidate; among those within `tie` of the closest,
/// the lowest rank wins. Returns the winner and the other tied targets.
fn choose(mut candidates: Vec<Candidate>, tie: f64) -> Option<(Candidate, Vec<SnapTarget>)> {
    let nearest = candidates
        .iter()
        .map(|c| c.distance)
        .min_by(f64::total_cmp)?;
    candidates.retain(|c| c.distance <= nearest + tie);
    candidates.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.distance.total_cmp(&b.distance)));
    let mut rest = candidates.into_iter();
    let best = rest.next()?;
    Some((best, rest.map(|c| c.target).collect()))
}

/// Moves `from` toward `to` by the eased pull for their distance.
fn eased_toward(from: &Point2, to: &Point2, easing: &Easing) -> Point2 {
    let delta = to - from;
    let d = delta.norm();
    if easing.snaps(d) {
        return *to;
    }
    if d < TOLERANCE {
        return *from;
    }
    from + delta * (easing.pull(d) / d)
}

/// Resolves where a dragged point lands.
///
/// Vertex and segment snapping (when the context allows attaching) wins
/// over everything else. Otherwise a line being drawn freely is eased toward
/// the nearest standard axis through its origin. Otherwise the candidate is
/// eased toward standard-gap spacing from nearby elements, independently
/// along each considered axis.
///
/// With an `axis` the candidate is constrained to the line through it along
/// that axis, and only displacements along it are considered.
#[derive(Debug, Clone)]
pub struct ResolveSnap<'a> {
    candidate: Point2,
    axis: Option<Axis>,
    context: &'a SnapContext,
}

impl<'a> ResolveSnap<'a> {
    #[must_use]
    pub fn new(candidate: Point2, axis: Option<Axis>, context: &'a SnapContext) -> Self {
        Self {
            candidate,
            axis,
            context,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the diagram holds a dangling reference.
    pub fn execute(&self, diagram: &Diagram, config: &EditorConfig) -> Result<SnapResult> {
        let easing = config.easing();
        let tie = config.tie_tolerance();
        let c = self.candidate;

        if self.context.attach {
            let candidates = point::candidates(diagram, &c, self.axis, self.context, config)?;
            if let Some((best, ties)) = choose(candidates, tie) {
                let result = SnapResult {
                    position: eased_toward(&c, &best.point, &easing),
                    exact: easing.snaps(best.distance),
                    targets: vec![best.target],
                    ties,
                };
                trace!(?result.targets, "snapped to geometry");
                return Ok(result);
            }
        }

        if let (None, Some(origin)) = (self.axis, self.context.origin) {
            if let Some(result) = self.standard_axis(&origin, config) {
                trace!(?result.targets, "snapped to standard axis");
                return Ok(result);
            }
        }

        let axes = match self.axis {
            Some(a) => vec![a],
            None => vec![Axis::HORIZONTAL, Axis::VERTICAL],
        };
        let mut result = SnapResult::unchanged(c);
        let mut exact = true;
        for axis in axes {
            let Some(hit) = gap::nearest(diagram, &c, axis, self.context, config)? else {
                continue;
            };
            result.position += axis.unit() * easing.ease(hit.delta);
            exact &= easing.snaps(hit.delta);
            result.targets.push(hit.target);
            result.ties.extend(hit.ties);
        }
        result.exact = exact && !result.targets.is_empty();
        if !result.targets.is_empty() {
            trace!(?result.targets, "snapped to standard gap");
        }
        Ok(result)
    }

    fn standard_axis(&self, origin: &Point2, config: &EditorConfig) -> Option<SnapResult> {
        let w = self.candidate - origin;
        if w.norm() < TOLERANCE {
            return None;
        }
        let easing = config.easing();
        let candidates = config
            .standard_axes()
            .iter()
            .map(|&axis| {
                let foot = origin + project(&w, axis);
                Candidate {
                    target: SnapTarget::StandardAxis(axis),
                    point: foot,
                    distance: (self.candidate - foot).norm(),
                    rank: 0,
                }
            })
            .filter(|c| easing.engages(c.distance))
            .collect();
        let (best, ties) = choose(candidates, config.tie_tolerance())?;
        Some(SnapResult {
            position: eased_toward(&self.candidate, &best.point, &easing),
            exact: easing.snaps(best.distance),
            targets: vec![best.target],
            ties,
        })
    }
}
