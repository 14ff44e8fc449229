//! Points grouped in buffers, laid out inside a [`Region`].
//!
//! Points live in one arena (`Vec<Point>`), stored contiguously in buffer
//! order; buffers own index ranges into it and neighbor sets hold arena
//! indices.

pub mod attractor;
pub mod point;
pub mod relax;
pub mod triangulation;

#[cfg(test)]
mod tests;

use std::{collections::{BTreeMap, BTreeSet}, ops::Range};

use log::{debug, info};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub use attractor::{AttractReport, Attractor, AttractorConfig};
pub use point::Point;
pub use relax::{Exit, Placement, RelaxConfig, Relaxation};

use crate::{
    density::Density,
    error::CorpusError,
    export::ExportSink,
    geometry::{BoundingBox, R2},
    region::Region,
};

pub type BufferId = u32;

/// Descriptor records per buffer; each record is one grain.
pub type Track = BTreeMap<BufferId, Vec<Vec<f64>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub id: BufferId,
    pub range: Range<usize>,
}

impl Buffer {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Initial placement of points before relaxation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Seeding {
    /// Spread points evenly by rank along each axis, keeping their order.
    #[default]
    Sorted,
    /// Map the points' current extent onto the frame.
    Resize,
}

/// Rectangle that seeding targets.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    #[default]
    Unit,
    Square { origin: R2<f64>, side: f64 },
    BoundingBox,
    InscribedSquare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorpusConfig {
    /// Record column used for x.
    pub descr_x: usize,
    /// Record column used for y.
    pub descr_y: usize,
    pub seeding: Seeding,
    pub density: Density,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            descr_x: 0,
            descr_y: 1,
            seeding: Seeding::default(),
            density: Density::default(),
        }
    }
}

/// Saved positions, origins and neighbor sets, for rolling back a speculative
/// relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<R2<f64>>,
    pub origins: Vec<R2<f64>>,
    pub neighbors: Vec<BTreeSet<usize>>,
}

#[derive(Debug, Clone)]
pub struct Corpus {
    buffers: Vec<Buffer>,
    points: Vec<Point>,
    region: Region,
    density: Density,
    is_normalized: bool,
}

impl Corpus {
    /// One buffer per track entry, one point per record, normalized to the unit
    /// square and seeded per `config.seeding`.
    pub fn new(track: &Track, region: Region, config: &CorpusConfig) -> Result<Corpus, CorpusError> {
        let mut buffers = Vec::with_capacity(track.len());
        let mut points = Vec::new();
        for (&id, records) in track {
            let start = points.len();
            for (record, values) in records.iter().enumerate() {
                let descriptor = |index: usize| {
                    values.get(index).cloned().ok_or(CorpusError::MissingDescriptor {
                        buffer: id,
                        record,
                        index,
                        len: values.len(),
                    })
                };
                points.push(Point::new(descriptor(config.descr_x)?, descriptor(config.descr_y)?));
            }
            buffers.push(Buffer { id, range: start..points.len() });
        }
        if points.is_empty() {
            return Err(CorpusError::Empty);
        }
        let mut corpus = Corpus {
            buffers,
            points,
            region,
            density: config.density.clone(),
            is_normalized: false,
        };
        info!(
            "corpus: {} points in {} buffers",
            corpus.points.len(),
            corpus.buffers.len(),
        );
        corpus.normalize()?;
        corpus.pre_uniformization(config.seeding, Frame::Unit)?;
        Ok(corpus)
    }

    /// Single-buffer corpus (id 0) from raw positions.
    pub fn from_positions(positions: &[R2<f64>], region: Region, config: &CorpusConfig) -> Result<Corpus, CorpusError> {
        let records: Vec<Vec<f64>> = positions.iter().map(|p| vec![p.x, p.y]).collect();
        let config = CorpusConfig { descr_x: 0, descr_y: 1, ..config.clone() };
        Corpus::new(&Track::from([(0, records)]), region, &config)
    }

    /// Rescale both axes to [0, 1] using the global extent of all points.
    pub fn normalize(&mut self) -> Result<(), CorpusError> {
        let bbox = self.extent()?;
        let (width, height) = (bbox.width(), bbox.height());
        for p in &mut self.points {
            p.position = R2::new((p.x() - bbox.min.x) / width, (p.y() - bbox.min.y) / height);
            p.update_origin();
        }
        self.is_normalized = true;
        debug!("normalized from {:?}", bbox);
        Ok(())
    }

    /// Current extent of the points; errors when either side is zero or not finite.
    fn extent(&self) -> Result<BoundingBox, CorpusError> {
        let positions = self.positions();
        let bbox = BoundingBox::of(&positions).ok_or(CorpusError::Empty)?;
        if !(bbox.width() > 0.) || !bbox.width().is_finite() {
            return Err(CorpusError::DegenerateAxis { axis: 'x' });
        }
        if !(bbox.height() > 0.) || !bbox.height().is_finite() {
            return Err(CorpusError::DegenerateAxis { axis: 'y' });
        }
        Ok(bbox)
    }

    /// Place points inside `frame` according to `seeding`.
    pub fn pre_uniformization(&mut self, seeding: Seeding, frame: Frame) -> Result<(), CorpusError> {
        let (origin, width, height) = match frame {
            Frame::Unit => (R2::zero(), 1., 1.),
            Frame::Square { origin, side } => (origin, side, side),
            Frame::BoundingBox => {
                let bbox = self.region.bounding_box();
                (bbox.min, bbox.width(), bbox.height())
            }
            Frame::InscribedSquare => {
                let (side, origin) = self.region.inscribed_square();
                (origin, side, side)
            }
        };
        match seeding {
            Seeding::Sorted => {
                let n = self.points.len();
                let rank = |i: usize| if n > 1 { i as f64 / (n - 1) as f64 } else { 0. };
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by_key(|&i| OrderedFloat(self.points[i].x()));
                for (i, &idx) in order.iter().enumerate() {
                    self.points[idx].position.x = rank(i) * width + origin.x;
                }
                order.sort_by_key(|&i| OrderedFloat(self.points[i].y()));
                for (i, &idx) in order.iter().enumerate() {
                    self.points[idx].position.y = rank(i) * height + origin.y;
                }
            }
            Seeding::Resize => {
                let bbox = self.extent()?;
                for p in &mut self.points {
                    let u = (p.x() - bbox.min.x) / bbox.width();
                    let v = (p.y() - bbox.min.y) / bbox.height();
                    p.position = R2::new(u * width + origin.x, v * height + origin.y);
                }
            }
        }
        debug!("seeded {:?} into {:?}: origin {}, {} x {}", seeding, frame, origin, width, height);
        Ok(())
    }

    pub fn set_region(&mut self, region: Region) {
        debug!("region swapped: area {:.4}", region.area());
        self.region = region;
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn density(&self) -> &Density {
        &self.density
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> Vec<R2<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn buffer(&self, id: BufferId) -> Result<&Buffer, CorpusError> {
        self.buffers
            .iter()
            .find(|b| b.id == id)
            .ok_or(CorpusError::UnknownBuffer(id))
    }

    /// Positions of one buffer's points, as separate x and y columns.
    pub fn buffer_positions(&self, id: BufferId) -> Result<(Vec<f64>, Vec<f64>), CorpusError> {
        let buffer = self.buffer(id)?;
        Ok(self.columns(buffer))
    }

    fn columns(&self, buffer: &Buffer) -> (Vec<f64>, Vec<f64>) {
        self.points[buffer.range.clone()]
            .iter()
            .map(|p| (p.x(), p.y()))
            .unzip()
    }

    /// Hand every buffer's positions to `sink`, in buffer order.
    pub fn export<S: ExportSink + ?Sized>(&self, sink: &mut S) {
        for buffer in &self.buffers {
            let (xs, ys) = self.columns(buffer);
            sink.send(buffer.id, &xs, &ys);
        }
    }

    /// Remember the current layout.
    pub fn store_reference(&mut self) {
        for p in &mut self.points {
            p.reference = Some(p.position);
        }
    }

    /// Move points back to their stored reference positions; returns how many
    /// had one.
    pub fn recall_reference(&mut self) -> usize {
        let mut recalled = 0;
        for p in &mut self.points {
            if let Some(reference) = p.reference {
                p.position = reference;
                recalled += 1;
            }
        }
        recalled
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            positions: self.positions(),
            origins: self.points.iter().map(|p| p.origin).collect(),
            neighbors: self.points.iter().map(|p| p.neighbors.clone()).collect(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CorpusError> {
        let expected = self.points.len();
        for actual in [snapshot.positions.len(), snapshot.origins.len(), snapshot.neighbors.len()] {
            if actual != expected {
                return Err(CorpusError::SnapshotMismatch { expected, actual });
            }
        }
        for (i, p) in self.points.iter_mut().enumerate() {
            p.position = snapshot.positions[i];
            p.origin = snapshot.origins[i];
            p.neighbors = snapshot.neighbors[i].clone();
            p.push = R2::zero();
        }
        Ok(())
    }
}
