use crate::error::TopologyError;
use crate::math::range::project_points;
use crate::math::{Direction, Point2, Range1d};
use crate::topology::{Diagram, Movable, SegmentId};

/// What a [`Body`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Movable(Movable),
    Segment(SegmentId),
}

/// An element reduced to the points that bound it, for 1-D extent tests.
#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    /// Movables whose motion carries this body.
    pub owners: Vec<Movable>,
    pub outline: Vec<Point2>,
}

impl Body {
    /// Range covered by the body when projected onto `direction`.
    #[must_use]
    pub fn extent(&self, direction: Direction) -> Range1d {
        project_points(&self.outline, direction)
    }

    #[must_use]
    pub fn is_owned_by(&self, m: Movable) -> bool {
        self.owners.contains(&m)
    }
}

/// Body of a junction (its point) or symbol (its rotated collision box).
///
/// # Errors
///
/// Returns an error if the movable is not found.
pub fn movable_body(diagram: &Diagram, m: Movable) -> Result<Body, TopologyError> {
    let outline = match m {
        Movable::Junction(_) => vec![diagram.movable_position(m)?],
        Movable::Symbol(_) => diagram.body(m)?.corners().to_vec(),
    };
    Ok(Body {
        kind: BodyKind::Movable(m),
        owners: vec![m],
        outline,
    })
}

/// Body of a segment: its two endpoints, owned by their movables.
///
/// # Errors
///
/// Returns an error if the segment or one of its vertices is not found.
pub fn segment_body(diagram: &Diagram, s: SegmentId) -> Result<Body, TopologyError> {
    let seg = diagram.segment(s)?;
    let (a, b) = diagram.endpoints(s)?;
    let mut owners = vec![seg.start.owner(), seg.end.owner()];
    owners.dedup();
    Ok(Body {
        kind: BodyKind::Segment(s),
        owners,
        outline: vec![a, b],
    })
}

/// Bodies of every movable followed by every segment.
///
/// # Errors
///
/// Returns an error if the diagram holds a dangling reference.
pub fn collect_bodies(diagram: &Diagram) -> Result<Vec<Body>, TopologyError> {
    let mut bodies = diagram
        .movables()
        .into_iter()
        .map(|m| movable_body(diagram, m))
        .collect::<Result<Vec<_>, _>>()?;
    for (s, _) in diagram.segments() {
        bodies.push(segment_body(diagram, s)?);
    }
    Ok(bodies)
}
