use std::collections::{HashMap, HashSet};

use crate::math::{Point2, Vector2};

use super::{Diagram, Movable, SegmentId, TopologyError};

/// Positions of every movable at one instant.
///
/// Gestures capture a snapshot when they begin and re-apply displacements
/// against it on every frame, so motion never accumulates drift. Restoring
/// the snapshot reverts an aborted gesture.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    positions: HashMap<Movable, Point2>,
}

impl Snapshot {
    /// Records the current position of every junction and symbol.
    #[must_use]
    pub fn capture(diagram: &Diagram) -> Self {
        let positions = diagram
            .movables()
            .into_iter()
            .filter_map(|m| diagram.movable_position(m).ok().map(|p| (m, p)))
            .collect();
        Self { positions }
    }

    /// Position of `m` when the snapshot was taken.
    #[must_use]
    pub fn original(&self, m: Movable) -> Option<Point2> {
        self.positions.get(&m).copied()
    }

    /// Moves every captured movable that still exists back to its original
    /// position and re-derives the axes of their segments.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment references a missing vertex.
    pub fn restore(&self, diagram: &mut Diagram) -> Result<(), TopologyError> {
        let mut touched = HashSet::new();
        for (&m, &p) in &self.positions {
            if !diagram.contains(m) || diagram.movable_position(m)? == p {
                continue;
            }
            diagram.set_movable_position(m, p)?;
            touched.extend(diagram.movable_edges(m)?);
        }
        refresh_axes(diagram, touched)
    }

    /// Places each listed movable at its original position plus its offset,
    /// then re-derives the axis of every segment attached to a moved entity.
    ///
    /// Movables not listed are left where they are; callers restore first
    /// when a previous frame may have displaced them. A movable created
    /// after the capture is offset from where it currently is.
    ///
    /// # Errors
    ///
    /// Returns an error if a listed movable is not found.
    pub fn apply<I>(&self, diagram: &mut Diagram, offsets: I) -> Result<(), TopologyError>
    where
        I: IntoIterator<Item = (Movable, Vector2)>,
    {
        let mut touched = HashSet::new();
        for (m, offset) in offsets {
            let origin = match self.original(m) {
                Some(p) => p,
                None => diagram.movable_position(m)?,
            };
            diagram.set_movable_position(m, origin + offset)?;
            touched.extend(diagram.movable_edges(m)?);
        }
        refresh_axes(diagram, touched)
    }
}

fn refresh_axes(diagram: &mut Diagram, segments: HashSet<SegmentId>) -> Result<(), TopologyError> {
    for s in segments {
        diagram.refresh_axis(s)?;
    }
    Ok(())
}
