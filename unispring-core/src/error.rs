use crate::corpus::BufferId;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("Polygon region needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("Polygon edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    #[error("Polygon edge {index} has zero length")]
    DegenerateEdge { index: usize },

    #[error("Polygon region has zero area")]
    ZeroArea,

    #[error("Circle region radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    #[error("Border sampling density must be positive, got {0}")]
    NonPositiveDensity(f64),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TriangulationError {
    #[error("Triangulation needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("All {count} points are collinear, no triangle can be formed")]
    Collinear { count: usize },

    #[error("Point insertion failed: {0}")]
    Insertion(String),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CorpusError {
    #[error("Corpus has no points")]
    Empty,

    #[error("Buffer {buffer} record {record} has {len} descriptors, index {index} requested")]
    MissingDescriptor {
        buffer: BufferId,
        record: usize,
        index: usize,
        len: usize,
    },

    #[error("All points share the same {axis} coordinate, cannot rescale")]
    DegenerateAxis { axis: char },

    #[error("Unknown buffer {0}")]
    UnknownBuffer(BufferId),

    #[error("Snapshot holds {actual} points, corpus has {expected}")]
    SnapshotMismatch { expected: usize, actual: usize },

    #[error("Buffer {buffer} has {actual} points but {expected} records")]
    LayoutMismatch {
        buffer: BufferId,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Invalid density table: {0}")]
    InvalidTable(String),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}
