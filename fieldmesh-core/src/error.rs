use crate::geometry::edge::EdgeKind;

/// Why a shape can not be meshed (or an edit to it was rejected).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Shape is empty")]
    Empty,

    #[error("Piece {piece} has {count} points, at least 3 are needed")]
    TooFewPoints { piece: usize, count: usize },

    #[error("Piece {piece} has a non-finite coordinate at vertex {vertex}")]
    NonFinite { piece: usize, vertex: usize },

    #[error("Piece {piece} has a zero length edge at vertex {vertex}")]
    ZeroLengthEdge { piece: usize, vertex: usize },

    #[error("Edge {edge1} of piece {piece1} crosses edge {edge2} of piece {piece2}")]
    EdgesCross { piece1: usize, edge1: usize, piece2: usize, edge2: usize },

    #[error("Piece {piece} has zero area")]
    ZeroArea { piece: usize },

    #[error("Shape has negative total area {area}")]
    NegativeArea { area: f64 },

    #[error("Piece {piece} has no edge {edge}")]
    NoSuchEdge { piece: usize, edge: usize },

    #[error("Edge {edge} of piece {piece} is already {existing:?}, can not make it {requested:?}")]
    EdgeKindConflict { piece: usize, edge: usize, existing: EdgeKind, requested: EdgeKind },
}

/// Failure reported by a triangulation kernel.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("Triangulation aborted: {0}")]
    Aborted(String),

    #[error("Unsupported switches: {0}")]
    Unsupported(String),

    #[error("Invalid kernel input: {0}")]
    InvalidInput(String),

    #[error("Input point {0} duplicates an earlier point")]
    DuplicatePoint(usize),

    #[error("Segment between ({ax}, {ay}) and ({bx}, {by}) is too short to split")]
    SegmentTooShort { ax: f64, ay: f64, bx: f64, by: f64 },

    #[error("Triangulation needs more than {0} points")]
    TooManyPoints(usize),

    #[error("Could not insert point ({x}, {y})")]
    Degenerate { x: f64, y: f64 },
}

/// Why mesh construction failed, or why a mesh no longer matches its shape.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Can not create mesh: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Can not create mesh because the sharpest angle is {angle} radians (minimum is {min})")]
    SharpAngle { angle: f64, min: f64 },

    #[error("Can not find a point inside piece {0}")]
    NoInteriorPoint(usize),

    #[error("Can not create mesh: {0}")]
    Kernel(#[from] KernelError),

    #[error("Shape has {shape} materials but the mesh was built with {mesh}")]
    MaterialCount { shape: usize, mesh: usize },

    #[error("Material {0} differs from the one the mesh was built with")]
    MaterialChanged(usize),

    #[error("Mesh point {point} refers to edge {edge} of piece {piece}, which the shape does not have")]
    StaleOrigin { point: usize, piece: usize, edge: usize },
}

/// Failure of a material property callback.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("Callback {callback:?} failed: {message}")]
    Callback { callback: String, message: String },

    #[error("Callback {callback:?} returned {got} values for {expected} points")]
    LengthMismatch { callback: String, expected: usize, got: usize },
}
