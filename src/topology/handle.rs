slotmap::new_key_type! {
    /// Unique identifier for a junction in the diagram.
    pub struct JunctionId;

    /// Unique identifier for a segment in the diagram.
    pub struct SegmentId;

    /// Unique identifier for a placed symbol in the diagram.
    pub struct SymbolId;
}

/// A port is addressed by its owning symbol and its index in the symbol kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    pub symbol: SymbolId,
    pub index: usize,
}

impl PortId {
    #[must_use]
    pub fn new(symbol: SymbolId, index: usize) -> Self {
        Self { symbol, index }
    }
}

/// A segment endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vertex {
    /// A free topology point owned by the diagram.
    Junction(JunctionId),
    /// A fixed attachment point owned by a symbol.
    Port(PortId),
}

impl Vertex {
    /// Returns the entity whose displacement moves this vertex.
    #[must_use]
    pub fn owner(self) -> Movable {
        match self {
            Self::Junction(j) => Movable::Junction(j),
            Self::Port(p) => Movable::Symbol(p.symbol),
        }
    }

    #[must_use]
    pub fn as_junction(self) -> Option<JunctionId> {
        match self {
            Self::Junction(j) => Some(j),
            Self::Port(_) => None,
        }
    }
}

/// An entity whose position can be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Movable {
    Junction(JunctionId),
    Symbol(SymbolId),
}

/// Anything the user can grab or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grabbable {
    Junction(JunctionId),
    Segment(SegmentId),
    Symbol(SymbolId),
}

impl From<Movable> for Grabbable {
    fn from(m: Movable) -> Self {
        match m {
            Movable::Junction(j) => Self::Junction(j),
            Movable::Symbol(s) => Self::Symbol(s),
        }
    }
}
