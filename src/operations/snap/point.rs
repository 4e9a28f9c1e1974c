use crate::config::EditorConfig;
use crate::error::TopologyError;
use crate::math::distance_2d::closest_point_on_segment;
use crate::math::intersect_2d::line_segment_intersect_2d;
use crate::math::{Axis, Point2, POSITION_TOLERANCE};
use crate::topology::{Diagram, Vertex};

use super::{Candidate, SnapContext, SnapTarget};

/// Attachable vertices and segments within reach of the candidate.
///
/// Without an axis distances are Euclidean. With one, the candidate may only
/// slide along the axis: a vertex counts if it lies on that line, a segment
/// where the line crosses it.
pub(super) fn candidates(
    diagram: &Diagram,
    candidate: &Point2,
    axis: Option<Axis>,
    context: &SnapContext,
    config: &EditorConfig,
) -> Result<Vec<Candidate>, TopologyError> {
    let reach = config.ease_radius();
    let mut out = Vec::new();

    for (v, position) in attachable_vertices(diagram, context)? {
        let hit = match axis {
            None => Some((position, (position - candidate).norm())),
            Some(axis) => {
                let u = axis.unit();
                let w = position - candidate;
                (w.perp(&u).abs() <= POSITION_TOLERANCE).then_some((position, w.dot(&u).abs()))
            }
        };
        if let Some((point, distance)) = hit.filter(|(_, d)| *d < reach) {
            out.push(Candidate {
                target: SnapTarget::Vertex(v),
                point,
                distance,
                rank: 0,
            });
        }
    }

    for (s, _) in diagram.segments() {
        if context.excludes_segment(diagram, s) {
            continue;
        }
        let (a, b) = diagram.endpoints(s)?;
        let hit = match axis {
            None => {
                let proj = closest_point_on_segment(candidate, &a, &b);
                Some((proj.point, proj.distance))
            }
            Some(axis) => line_segment_intersect_2d(candidate, &axis.unit(), &a, &b)
                .map(|(point, along)| (point, along.abs())),
        };
        if let Some((point, distance)) = hit.filter(|(_, d)| *d < reach) {
            out.push(Candidate {
                target: SnapTarget::Segment { segment: s, point },
                point,
                distance,
                rank: 1,
            });
        }
    }
    Ok(out)
}

/// Junctions plus ports that can still take an edge.
fn attachable_vertices(
    diagram: &Diagram,
    context: &SnapContext,
) -> Result<Vec<(Vertex, Point2)>, TopologyError> {
    let mut out: Vec<(Vertex, Point2)> = diagram
        .junctions()
        .map(|(id, j)| (Vertex::Junction(id), j.position))
        .filter(|(v, _)| !context.excludes_vertex(*v))
        .collect();
    for (id, position) in diagram.ports() {
        let v = Vertex::Port(id);
        if context.excludes_vertex(v) || diagram.port(id)?.edge.is_some() {
            continue;
        }
        out.push((v, position));
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::math::{Range1d, Range2d, Rotation, Vector2};
    use crate::topology::{Movable, PortId, SymbolKind};

    #[test]
    fn axis_mode_only_sees_vertices_on_the_line() {
        let mut d = Diagram::new();
        let on = d.add_junction(Point2::new(10.0, 0.0));
        d.add_junction(Point2::new(5.0, 3.0));
        let ctx = SnapContext::new().attaching();
        let found = candidates(
            &d,
            &Point2::new(0.0, 0.0),
            Some(Axis::HORIZONTAL),
            &ctx,
            &EditorConfig::default(),
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target, SnapTarget::Vertex(Vertex::Junction(on)));
    }

    #[test]
    fn axis_mode_hits_crossing_segment() {
        let mut d = Diagram::new();
        let a = d.add_junction(Point2::new(12.0, -20.0));
        let b = d.add_junction(Point2::new(12.0, 20.0));
        let s = d
            .connect(Vertex::Junction(a), Vertex::Junction(b), false)
            .unwrap();
        let ctx = SnapContext::new().attaching();
        let found = candidates(
            &d,
            &Point2::new(0.0, 0.0),
            Some(Axis::HORIZONTAL),
            &ctx,
            &EditorConfig::default(),
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0].target, SnapTarget::Segment { segment, .. } if segment == s));
        assert!((found[0].distance - 12.0).abs() < 1e-9);
    }

    #[test]
    fn occupied_ports_and_excluded_movables_are_skipped() {
        let mut d = Diagram::new();
        let kind = Arc::new(SymbolKind::new(
            "two-pin",
            Range2d::new(Range1d::new(-5.0, 5.0), Range1d::new(-5.0, 5.0)),
            vec![Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0)],
        ));
        let sym = d.spawn_symbol(kind, Point2::new(0.0, 0.0), Rotation::IDENTITY);
        let j = d.add_junction(Point2::new(-40.0, 0.0));
        d.connect(Vertex::Port(PortId::new(sym, 0)), Vertex::Junction(j), false)
            .unwrap();

        let ctx = SnapContext::new().attaching();
        let found = attachable_vertices(&d, &ctx).unwrap();
        assert!(found.iter().all(|(v, _)| *v != Vertex::Port(PortId::new(sym, 0))));
        assert!(found.iter().any(|(v, _)| *v == Vertex::Port(PortId::new(sym, 1))));

        let mut ctx = SnapContext::new().attaching();
        ctx.exclude_movable(Movable::Symbol(sym));
        let found = attachable_vertices(&d, &ctx).unwrap();
        assert_eq!(found, vec![(Vertex::Junction(j), Point2::new(-40.0, 0.0))]);
    }
}
