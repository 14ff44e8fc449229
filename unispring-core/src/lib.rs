//! Density-aware spring relaxation of 2-D point layouts inside polygonal or
//! circular regions.

pub mod corpus;
pub mod density;
pub mod error;
pub mod export;
pub mod geometry;
pub mod region;

pub use corpus::{
    AttractReport, Attractor, AttractorConfig, Buffer, BufferId, Corpus, CorpusConfig, Exit, Frame,
    Placement, Point, RelaxConfig, Relaxation, Seeding, Snapshot, Track,
};
pub use density::{Density, GaussianBump, HistogramTable};
pub use error::{CorpusError, RegionError, TriangulationError};
pub use export::{append_layout, ExportMessage, ExportSink, MatrixExport};
pub use geometry::{BoundingBox, R2};
pub use region::{CircleRegion, PolygonRegion, Region, RegionSpec};

/// Parse a log level string into LevelFilter.
pub fn parse_log_level(level: Option<&str>) -> Result<log::LevelFilter, String> {
    match level {
        Some("error") => Ok(log::LevelFilter::Error),
        Some("warn") => Ok(log::LevelFilter::Warn),
        Some("info") | Some("") | None => Ok(log::LevelFilter::Info),
        Some("debug") => Ok(log::LevelFilter::Debug),
        Some("trace") => Ok(log::LevelFilter::Trace),
        Some(level) => Err(format!("invalid log level: {}", level)),
    }
}
