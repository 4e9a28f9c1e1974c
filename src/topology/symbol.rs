use std::collections::HashMap;
use std::sync::Arc;

use crate::math::{Point2, Range2d, Rotation, Vector2};

use super::handle::SegmentId;

/// Immutable geometry of a schematic symbol, in symbol-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolKind {
    pub name: String,
    /// Region other elements are kept out of.
    pub collision_box: Range2d,
    /// Attachment points relative to the symbol origin.
    pub port_offsets: Vec<Vector2>,
}

impl SymbolKind {
    #[must_use]
    pub fn new(name: impl Into<String>, collision_box: Range2d, port_offsets: Vec<Vector2>) -> Self {
        Self {
            name: name.into(),
            collision_box,
            port_offsets,
        }
    }
}

/// Symbol kinds supplied by the host application, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    kinds: HashMap<String, Arc<SymbolKind>>,
}

impl SymbolCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind, replacing any previous kind of the same name.
    pub fn insert(&mut self, kind: SymbolKind) -> Arc<SymbolKind> {
        let kind = Arc::new(kind);
        self.kinds.insert(kind.name.clone(), Arc::clone(&kind));
        kind
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<SymbolKind>> {
        self.kinds.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SymbolKind>> {
        self.kinds.values()
    }
}

/// Attachment state of one port.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortData {
    /// A port carries at most one segment.
    pub edge: Option<SegmentId>,
}

/// A placed symbol.
#[derive(Debug, Clone)]
pub struct SymbolData {
    pub kind: Arc<SymbolKind>,
    pub position: Point2,
    pub rotation: Rotation,
    /// One entry per port offset of `kind`.
    pub ports: Vec<PortData>,
}

impl SymbolData {
    #[must_use]
    pub fn new(kind: Arc<SymbolKind>, position: Point2, rotation: Rotation) -> Self {
        let ports = vec![PortData::default(); kind.port_offsets.len()];
        Self {
            kind,
            position,
            rotation,
            ports,
        }
    }

    /// World position of port `index` with the symbol placed at `position`.
    #[must_use]
    pub fn port_position_at(&self, index: usize, position: &Point2) -> Option<Point2> {
        self.kind
            .port_offsets
            .get(index)
            .map(|offset| *position + self.rotation.apply(offset))
    }

    #[must_use]
    pub fn port_position(&self, index: usize) -> Option<Point2> {
        self.port_position_at(index, &self.position)
    }

    /// World-space bounding box of the rotated collision box.
    #[must_use]
    pub fn world_box(&self) -> Range2d {
        let corners = self.kind.collision_box.corners();
        let mut rotated = corners.iter().map(|c| self.position + self.rotation.apply(&c.coords));
        let first = rotated
            .next()
            .map_or_else(|| Range2d::point(&self.position), |p| Range2d::point(&p));
        rotated.fold(first, |acc, p| acc.union(&Range2d::point(&p)))
    }

    /// Segments attached to any port.
    pub fn edges(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.ports.iter().filter_map(|p| p.edge)
    }
}
