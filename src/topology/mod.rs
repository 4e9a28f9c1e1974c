pub mod crossing;
pub mod edit;
pub mod handle;
pub mod junction;
pub mod segment;
pub mod snapshot;
pub mod symbol;

pub use crossing::Crossing;
pub use edit::NewSegment;
pub use handle::{Grabbable, JunctionId, Movable, PortId, SegmentId, SymbolId, Vertex};
pub use junction::{JunctionData, JunctionGlyph};
pub use segment::{CrossingType, SegmentData};
pub use snapshot::Snapshot;
pub use symbol::{PortData, SymbolCatalog, SymbolData, SymbolKind};

use std::sync::Arc;

use slotmap::SlotMap;

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::distance_2d::closest_point_on_segment;
use crate::math::{Axis, Point2, Range2d, Rotation};

/// Result of a hit test against the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum Pick {
    Vertex(Vertex),
    Crossing(Crossing),
    Segment { segment: SegmentId, point: Point2 },
}

/// Central arena that owns all junctions, segments and symbols.
///
/// Entities reference each other via typed IDs (generational indices).
/// Every mutation bumps [`Diagram::version`], so observers can poll for
/// changes instead of tracking identities.
#[derive(Debug, Default)]
pub struct Diagram {
    junctions: SlotMap<JunctionId, JunctionData>,
    segments: SlotMap<SegmentId, SegmentData>,
    symbols: SlotMap<SymbolId, SymbolData>,
    version: u64,
}

impl Diagram {
    /// Creates a new, empty diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter incremented by every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }

    // --- Junction operations ---

    /// Inserts an unconnected junction and returns its ID.
    pub fn add_junction(&mut self, position: Point2) -> JunctionId {
        self.touch();
        self.junctions.insert(JunctionData::new(position))
    }

    /// Returns a reference to the junction data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the diagram.
    pub fn junction(&self, id: JunctionId) -> Result<&JunctionData, TopologyError> {
        self.junctions
            .get(id)
            .ok_or(TopologyError::EntityNotFound("junction"))
    }

    pub(crate) fn junction_mut(&mut self, id: JunctionId) -> Result<&mut JunctionData, TopologyError> {
        self.junctions
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("junction"))
    }

    pub fn junctions(&self) -> impl Iterator<Item = (JunctionId, &JunctionData)> {
        self.junctions.iter()
    }

    // --- Segment operations ---

    /// Returns a reference to the segment data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the diagram.
    pub fn segment(&self, id: SegmentId) -> Result<&SegmentData, TopologyError> {
        self.segments
            .get(id)
            .ok_or(TopologyError::EntityNotFound("segment"))
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> Result<&mut SegmentData, TopologyError> {
        self.segments
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("segment"))
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentData)> {
        self.segments.iter()
    }

    /// Connects two vertices with a segment whose axis follows their positions.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing, a port is already
    /// occupied, or the vertices coincide (no axis can be derived).
    pub fn connect(&mut self, start: Vertex, end: Vertex, is_rigid: bool) -> Result<SegmentId> {
        let a = self.vertex_position(start)?;
        let b = self.vertex_position(end)?;
        let axis = Axis::from_vector(&(b - a)).ok_or(GeometryError::ZeroVector)?;
        self.connect_along(start, end, axis, is_rigid)
    }

    /// Connects two vertices with an explicit axis.
    ///
    /// Used for zero-length segments (a draw that has not moved yet), whose
    /// axis cannot be derived from geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing, the same vertex is given
    /// twice, or a port is already occupied.
    pub fn connect_along(
        &mut self,
        start: Vertex,
        end: Vertex,
        axis: Axis,
        is_rigid: bool,
    ) -> Result<SegmentId> {
        if start == end {
            return Err(TopologyError::InvalidTopology("segment endpoints must differ".into()).into());
        }
        for v in [start, end] {
            self.vertex_position(v)?;
            if let Vertex::Port(p) = v {
                if self.port(p)?.edge.is_some() {
                    return Err(TopologyError::PortOccupied.into());
                }
            }
        }
        let id = self
            .segments
            .insert(SegmentData::new(start, end, axis, is_rigid));
        self.attach(id, start)?;
        self.attach(id, end)?;
        self.touch();
        Ok(id)
    }

    /// Marks a segment as rigid or stretchable.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found.
    pub fn set_rigid(&mut self, id: SegmentId, is_rigid: bool) -> Result<(), TopologyError> {
        self.segment_mut(id)?.is_rigid = is_rigid;
        self.touch();
        Ok(())
    }

    /// Returns the current endpoint positions of a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or one of its vertices is missing.
    pub fn endpoints(&self, id: SegmentId) -> Result<(Point2, Point2), TopologyError> {
        let seg = self.segment(id)?;
        Ok((self.vertex_position(seg.start)?, self.vertex_position(seg.end)?))
    }

    /// Re-derives a segment's axis from its endpoints.
    ///
    /// Zero-length segments keep their previous axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or one of its vertices is missing.
    pub fn refresh_axis(&mut self, id: SegmentId) -> Result<(), TopologyError> {
        let (a, b) = self.endpoints(id)?;
        if let Some(axis) = Axis::from_vector(&(b - a)) {
            let seg = self.segment_mut(id)?;
            if seg.axis != axis {
                seg.axis = axis;
                self.touch();
            }
        }
        Ok(())
    }

    // --- Symbol operations ---

    /// Places a symbol with unconnected ports.
    pub fn spawn_symbol(&mut self, kind: Arc<SymbolKind>, position: Point2, rotation: Rotation) -> SymbolId {
        self.touch();
        self.symbols.insert(SymbolData::new(kind, position, rotation))
    }

    /// Returns a reference to the symbol data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the diagram.
    pub fn symbol(&self, id: SymbolId) -> Result<&SymbolData, TopologyError> {
        self.symbols
            .get(id)
            .ok_or(TopologyError::EntityNotFound("symbol"))
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> Result<&mut SymbolData, TopologyError> {
        self.symbols
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("symbol"))
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &SymbolData)> {
        self.symbols.iter()
    }

    /// Returns the attachment state of a port.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol or port index is not found.
    pub fn port(&self, id: PortId) -> Result<&PortData, TopologyError> {
        self.symbol(id.symbol)?
            .ports
            .get(id.index)
            .ok_or(TopologyError::EntityNotFound("port"))
    }

    /// All ports with their world positions.
    pub fn ports(&self) -> impl Iterator<Item = (PortId, Point2)> + '_ {
        self.symbols.iter().flat_map(|(sid, sym)| {
            (0..sym.ports.len())
                .filter_map(move |i| sym.port_position(i).map(|p| (PortId::new(sid, i), p)))
        })
    }

    // --- Vertex and movable queries ---

    /// Returns the current position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn vertex_position(&self, v: Vertex) -> Result<Point2, TopologyError> {
        match v {
            Vertex::Junction(j) => Ok(self.junction(j)?.position),
            Vertex::Port(p) => self
                .symbol(p.symbol)?
                .port_position(p.index)
                .ok_or(TopologyError::EntityNotFound("port")),
        }
    }

    /// Segments attached to a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn vertex_edges(&self, v: Vertex) -> Result<Vec<SegmentId>, TopologyError> {
        match v {
            Vertex::Junction(j) => Ok(self.junction(j)?.edges.clone()),
            Vertex::Port(p) => Ok(self.port(p)?.edge.into_iter().collect()),
        }
    }

    /// Every junction and symbol.
    #[must_use]
    pub fn movables(&self) -> Vec<Movable> {
        self.junctions
            .keys()
            .map(Movable::Junction)
            .chain(self.symbols.keys().map(Movable::Symbol))
            .collect()
    }

    /// Returns whether the movable still exists.
    #[must_use]
    pub fn contains(&self, m: Movable) -> bool {
        match m {
            Movable::Junction(j) => self.junctions.contains_key(j),
            Movable::Symbol(s) => self.symbols.contains_key(s),
        }
    }

    /// Returns the position of a junction, or the origin of a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the movable is not found.
    pub fn movable_position(&self, m: Movable) -> Result<Point2, TopologyError> {
        match m {
            Movable::Junction(j) => Ok(self.junction(j)?.position),
            Movable::Symbol(s) => Ok(self.symbol(s)?.position),
        }
    }

    /// Moves a junction or symbol without touching segment axes.
    ///
    /// Callers re-derive the axes of affected segments afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the movable is not found.
    pub fn set_movable_position(&mut self, m: Movable, position: Point2) -> Result<(), TopologyError> {
        match m {
            Movable::Junction(j) => self.junction_mut(j)?.position = position,
            Movable::Symbol(s) => self.symbol_mut(s)?.position = position,
        }
        self.touch();
        Ok(())
    }

    /// Segments attached to a junction, or to any port of a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the movable is not found.
    pub fn movable_edges(&self, m: Movable) -> Result<Vec<SegmentId>, TopologyError> {
        match m {
            Movable::Junction(j) => Ok(self.junction(j)?.edges.clone()),
            Movable::Symbol(s) => Ok(self.symbol(s)?.edges().collect()),
        }
    }

    /// Distinct axes of the segments attached to a movable, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the movable or one of its segments is not found.
    pub fn incident_axes(&self, m: Movable) -> Result<Vec<Axis>, TopologyError> {
        let mut axes = self
            .movable_edges(m)?
            .into_iter()
            .map(|e| self.segment(e).map(|s| s.axis))
            .collect::<Result<Vec<_>, _>>()?;
        axes.sort_unstable();
        axes.dedup();
        Ok(axes)
    }

    /// Region a movable occupies: a point for junctions, the rotated
    /// collision box for symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if the movable is not found.
    pub fn body(&self, m: Movable) -> Result<Range2d, TopologyError> {
        match m {
            Movable::Junction(j) => Ok(Range2d::point(&self.junction(j)?.position)),
            Movable::Symbol(s) => Ok(self.symbol(s)?.world_box()),
        }
    }

    /// Returns whether a junction has exactly two collinear edges, so it can
    /// be drawn as a plain pass-through point.
    ///
    /// Such junctions are never merged away automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction or one of its edges is not found.
    pub fn is_straight_through(&self, id: JunctionId) -> Result<bool, TopologyError> {
        let junction = self.junction(id)?;
        let [a, b] = junction.edges.as_slice() else {
            return Ok(false);
        };
        let here = junction.position;
        let far = |e: SegmentId| -> Result<Point2, TopologyError> {
            let seg = self.segment(e)?;
            let other = seg
                .other_end(Vertex::Junction(id))
                .ok_or_else(|| TopologyError::InvalidTopology("dangling adjacency".into()))?;
            self.vertex_position(other)
        };
        let da = far(*a)? - here;
        let db = far(*b)? - here;
        let same_axis = self.segment(*a)?.axis == self.segment(*b)?.axis;
        Ok(same_axis && da.dot(&db) < 0.0)
    }

    /// Sets the glyph of a junction from its valence: one edge shows a plug,
    /// anything else the default marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction is not found.
    pub fn refresh_glyph(&mut self, id: JunctionId) -> Result<(), TopologyError> {
        let junction = self.junction_mut(id)?;
        let glyph = if junction.edges.len() == 1 {
            JunctionGlyph::Plug
        } else {
            JunctionGlyph::Default
        };
        if junction.glyph != glyph {
            junction.glyph = glyph;
            self.touch();
        }
        Ok(())
    }

    /// Flips a junction's glyph between default and plug.
    ///
    /// # Errors
    ///
    /// Returns an error if the junction is not found.
    pub fn toggle_glyph(&mut self, id: JunctionId) -> Result<JunctionGlyph, TopologyError> {
        let junction = self.junction_mut(id)?;
        junction.glyph = junction.glyph.toggled();
        let glyph = junction.glyph;
        self.touch();
        Ok(glyph)
    }

    /// Hit test: the nearest vertex within `radius`, else the nearest visible
    /// crossing, else the nearest point on a segment.
    #[must_use]
    pub fn pick(&self, point: &Point2, radius: f64, crossing_clearance: f64) -> Option<Pick> {
        let nearest_vertex = self
            .junctions
            .iter()
            .map(|(id, j)| (Vertex::Junction(id), j.position))
            .chain(self.ports().map(|(id, p)| (Vertex::Port(id), p)))
            .map(|(v, p)| (v, (p - point).norm()))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((v, _)) = nearest_vertex {
            return Some(Pick::Vertex(v));
        }

        let nearest_crossing = self
            .crossings(crossing_clearance)
            .into_iter()
            .map(|c| {
                let d = (c.point - point).norm();
                (c, d)
            })
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((c, _)) = nearest_crossing {
            return Some(Pick::Crossing(c));
        }

        self.segments
            .keys()
            .filter_map(|id| {
                let (a, b) = self.endpoints(id).ok()?;
                let proj = closest_point_on_segment(point, &a, &b);
                (proj.distance <= radius).then_some((id, proj))
            })
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
            .map(|(segment, proj)| Pick::Segment {
                segment,
                point: proj.point,
            })
    }

    // --- Adjacency bookkeeping ---

    fn attach(&mut self, seg: SegmentId, v: Vertex) -> Result<(), TopologyError> {
        match v {
            Vertex::Junction(j) => self.junction_mut(j)?.edges.push(seg),
            Vertex::Port(p) => {
                let port = self
                    .symbol_mut(p.symbol)?
                    .ports
                    .get_mut(p.index)
                    .ok_or(TopologyError::EntityNotFound("port"))?;
                if port.edge.is_some() {
                    return Err(TopologyError::PortOccupied);
                }
                port.edge = Some(seg);
            }
        }
        Ok(())
    }

    fn detach(&mut self, seg: SegmentId, v: Vertex) -> Result<(), TopologyError> {
        match v {
            Vertex::Junction(j) => self.junction_mut(j)?.edges.retain(|e| *e != seg),
            Vertex::Port(p) => {
                let port = self
                    .symbol_mut(p.symbol)?
                    .ports
                    .get_mut(p.index)
                    .ok_or(TopologyError::EntityNotFound("port"))?;
                if port.edge == Some(seg) {
                    port.edge = None;
                }
            }
        }
        Ok(())
    }

    /// Removes a segment from the arena and from both endpoints' adjacency,
    /// and drops every crossing-type entry that names it.
    fn remove_segment(&mut self, id: SegmentId) -> Result<SegmentData, TopologyError> {
        let data = self
            .segments
            .remove(id)
            .ok_or(TopologyError::EntityNotFound("segment"))?;
        self.detach(id, data.start)?;
        self.detach(id, data.end)?;
        for (_, other) in &mut self.segments {
            other.crossing_types.remove(&id);
        }
        self.touch();
        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Range1d, Vector2};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn two_port_kind() -> Arc<SymbolKind> {
        Arc::new(SymbolKind::new(
            "two-port",
            Range2d::new(Range1d::new(-10.0, 10.0), Range1d::new(-5.0, 5.0)),
            vec![Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0)],
        ))
    }

    #[test]
    fn connect_derives_axis_and_adjacency() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let b = d.add_junction(p(0.0, 50.0));
        let s = d
            .connect(Vertex::Junction(a), Vertex::Junction(b), false)
            .unwrap();
        assert_eq!(d.segment(s).unwrap().axis, Axis::VERTICAL);
        assert_eq!(d.junction(a).unwrap().edges, vec![s]);
        assert_eq!(d.junction(b).unwrap().edges, vec![s]);
    }

    #[test]
    fn connect_coincident_vertices_fails() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(1.0, 1.0));
        let b = d.add_junction(p(1.0, 1.0));
        assert!(d.connect(Vertex::Junction(a), Vertex::Junction(b), false).is_err());
        assert!(d
            .connect_along(Vertex::Junction(a), Vertex::Junction(b), Axis::HORIZONTAL, false)
            .is_ok());
    }

    #[test]
    fn port_accepts_one_edge() {
        let mut d = Diagram::new();
        let sym = d.spawn_symbol(two_port_kind(), p(0.0, 0.0), Rotation::IDENTITY);
        let a = d.add_junction(p(-40.0, 0.0));
        let b = d.add_junction(p(-10.0, 30.0));
        let port = Vertex::Port(PortId::new(sym, 0));
        d.connect(port, Vertex::Junction(a), false).unwrap();
        let second = d.connect(port, Vertex::Junction(b), false);
        assert!(matches!(
            second,
            Err(crate::SchematicError::Topology(TopologyError::PortOccupied))
        ));
        assert_eq!(d.movable_edges(Movable::Symbol(sym)).unwrap().len(), 1);
    }

    #[test]
    fn version_counts_mutations() {
        let mut d = Diagram::new();
        let v0 = d.version();
        let a = d.add_junction(p(0.0, 0.0));
        assert!(d.version() > v0);
        let v1 = d.version();
        d.set_movable_position(Movable::Junction(a), p(5.0, 5.0)).unwrap();
        assert!(d.version() > v1);
    }

    #[test]
    fn straight_through_detection() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let m = d.add_junction(p(10.0, 0.0));
        let b = d.add_junction(p(20.0, 0.0));
        let c = d.add_junction(p(10.0, 10.0));
        d.connect(Vertex::Junction(a), Vertex::Junction(m), false).unwrap();
        d.connect(Vertex::Junction(m), Vertex::Junction(b), false).unwrap();
        assert!(d.is_straight_through(m).unwrap());
        d.connect(Vertex::Junction(m), Vertex::Junction(c), false).unwrap();
        assert!(!d.is_straight_through(m).unwrap());
    }

    #[test]
    fn incident_axes_are_distinct() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let m = d.add_junction(p(10.0, 0.0));
        let b = d.add_junction(p(20.0, 0.0));
        let c = d.add_junction(p(10.0, 10.0));
        for (x, y) in [(a, m), (m, b), (m, c)] {
            d.connect(Vertex::Junction(x), Vertex::Junction(y), false).unwrap();
        }
        let axes = d.incident_axes(Movable::Junction(m)).unwrap();
        assert_eq!(axes, vec![Axis::HORIZONTAL, Axis::VERTICAL]);
    }

    #[test]
    fn pick_prefers_vertices_over_segments() {
        let mut d = Diagram::new();
        let a = d.add_junction(p(0.0, 0.0));
        let b = d.add_junction(p(100.0, 0.0));
        let s = d.connect(Vertex::Junction(a), Vertex::Junction(b), false).unwrap();
        assert_eq!(
            d.pick(&p(2.0, 1.0), 5.0, 6.0),
            Some(Pick::Vertex(Vertex::Junction(a)))
        );
        match d.pick(&p(50.0, 3.0), 5.0, 6.0) {
            Some(Pick::Segment { segment, point }) => {
                assert_eq!(segment, s);
                assert!((point.x - 50.0).abs() < 1e-12);
            }
            other => panic!("unexpected pick {other:?}"),
        }
        assert!(d.pick(&p(50.0, 30.0), 5.0, 6.0).is_none());
    }
}
