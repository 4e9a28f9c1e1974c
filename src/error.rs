use thiserror::Error;

/// Top-level error type for the schematic engine.
#[derive(Debug, Error)]
pub enum SchematicError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the topology graph.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("port already has an attached segment")]
    PortOccupied,

    #[error("junction cannot become a crossing: {0}")]
    NotCrossingCapable(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to interactive operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("unknown or finished operation")]
    UnknownOperation,

    #[error("operation cannot start on a crossing")]
    OnCrossing,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`SchematicError`].
pub type Result<T, E = SchematicError> = std::result::Result<T, E>;
