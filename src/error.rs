use thiserror::Error;

/// Top-level error type for the store graph engine.
#[derive(Debug, Error)]
pub enum StoreGraphError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors raised while decoding polygon text or JSON payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected {expected} at offset {offset} in polygon text")]
    UnexpectedToken { expected: &'static str, offset: usize },

    #[error("invalid coordinate `{0}`")]
    InvalidNumber(String),

    #[error("polygon ring has {0} points, at least 3 are required")]
    TooFewPoints(usize),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when a command's input does not satisfy its contract.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("reshape expects exactly 4 points, got {0}")]
    PointCount(usize),

    #[error("reshape moves {0} corners, only one may change at a time")]
    AmbiguousReshape(usize),

    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("node already exists: {0}")]
    DuplicateNode(String),

    #[error("command `{command}` is not allowed in {mode} mode")]
    ModeMismatch {
        command: &'static str,
        mode: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate polygon: {0}")]
    Degenerate(String),

    #[error("result cannot be stored as a single ring: {0}")]
    Unrepresentable(String),

    #[error("unsupported by this kernel: {0}")]
    Unsupported(String),
}

/// Errors signalling that the node arena lost its internal consistency.
///
/// These are fatal for a build and cause the registry to roll back.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("inconsistent registry: {0}")]
    Inconsistent(String),
}

/// Convenience type alias for results using [`StoreGraphError`].
pub type Result<T> = std::result::Result<T, StoreGraphError>;
