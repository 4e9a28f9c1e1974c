use crate::config::EditorConfig;
use crate::error::TopologyError;
use crate::math::{Axis, Point2, Range2d};
use crate::operations::extent::{collect_bodies, Body, BodyKind};
use crate::topology::Diagram;

use super::{SnapContext, SnapTarget};

/// Best standard-gap correction along one axis.
#[derive(Debug, Clone)]
pub(super) struct GapHit {
    /// Signed displacement along `axis.unit()` that reaches exact spacing.
    pub(super) delta: f64,
    pub(super) target: SnapTarget,
    pub(super) ties: Vec<SnapTarget>,
}

/// Finds the element that would sit exactly one standard gap from the
/// moving body after the smallest shift along `axis`.
///
/// Only elements in line with the moving body count: their extents across
/// `axis` must come within the standard gap of each other. Segments parallel
/// to `axis` are skipped; their endpoints stand in for them.
pub(super) fn nearest(
    diagram: &Diagram,
    candidate: &Point2,
    axis: Axis,
    context: &SnapContext,
    config: &EditorConfig,
) -> Result<Option<GapHit>, TopologyError> {
    let gap = config.standard_gap();
    let along = axis.direction();
    let across = along.perpendicular();

    let moving = context
        .body
        .map_or_else(|| Range2d::point(candidate), |b| b.translated(&candidate.coords));
    let slide = moving.project(along);
    let cross = moving.project(across).padded(0.5 * gap);

    let mut hits: Vec<(f64, SnapTarget)> = Vec::new();
    for body in collect_bodies(diagram)? {
        if !is_reference(diagram, &body, axis, context) {
            continue;
        }
        if !body.extent(across).padded(0.5 * gap).overlaps(&cross) {
            continue;
        }
        let other = body.extent(along);
        let before = (other.min - gap) - slide.max;
        let after = (other.max + gap) - slide.min;
        let delta = if before.abs() <= after.abs() { before } else { after };
        if config.easing().engages(delta) {
            hits.push((
                delta,
                SnapTarget::StandardGap {
                    axis,
                    body: body.kind,
                },
            ));
        }
    }

    let Some(best) = hits.iter().map(|(d, _)| d.abs()).min_by(f64::total_cmp) else {
        return Ok(None);
    };
    let tie = config.tie_tolerance();
    let mut tied = hits.into_iter().filter(|(d, _)| d.abs() <= best + tie);
    let Some((delta, target)) = tied.next() else {
        return Ok(None);
    };
    Ok(Some(GapHit {
        delta,
        target,
        ties: tied.map(|(_, t)| t).collect(),
    }))
}

fn is_reference(diagram: &Diagram, body: &Body, axis: Axis, context: &SnapContext) -> bool {
    match body.kind {
        BodyKind::Movable(m) => !context.excludes_movable(m),
        BodyKind::Segment(s) => {
            !context.excludes_segment(diagram, s)
                && diagram.segment(s).is_ok_and(|seg| seg.axis != axis)
        }
    }
}
