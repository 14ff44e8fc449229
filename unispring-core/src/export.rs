//! Handing layouts to the outside world.
//!
//! [`ExportSink`] is the per-buffer call contract used during relaxation;
//! [`MatrixExport`] turns it into the chunked message sequence a matrix-backed
//! instrument expects, and [`append_layout`] produces the persisted form.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    corpus::{BufferId, Corpus, Track},
    error::CorpusError,
};

/// Values per `SetMatrix` message.
pub const CHUNK_SIZE: usize = 200;
/// Matrix column receiving x positions.
pub const X_COLUMN: u32 = 7;
/// Matrix column receiving y positions.
pub const Y_COLUMN: u32 = 8;

/// Receives one buffer's positions at a time. Fire-and-forget: delivery
/// failures are the sink's business.
pub trait ExportSink {
    fn send(&mut self, id: BufferId, xs: &[f64], ys: &[f64]);
}

impl<F: FnMut(BufferId, &[f64], &[f64])> ExportSink for F {
    fn send(&mut self, id: BufferId, xs: &[f64], ys: &[f64]) {
        self(id, xs, ys)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExportMessage {
    BufferIndex { id: BufferId },
    MatrixCol { col: u32 },
    SetMatrix { offset: usize, values: Vec<f64> },
    Refresh,
}

impl ExportMessage {
    /// Address the message is sent to.
    pub fn address(&self) -> &'static str {
        match self {
            ExportMessage::BufferIndex { .. } => "/buffer_index",
            ExportMessage::MatrixCol { .. } => "/matrixcol",
            ExportMessage::SetMatrix { .. } => "/set_matrix",
            ExportMessage::Refresh => "/refresh",
        }
    }
}

/// Splits each buffer into [`ExportMessage`]s and hands them to `emit`.
pub struct MatrixExport<F: FnMut(ExportMessage)> {
    emit: F,
    chunk_size: usize,
}

impl<F: FnMut(ExportMessage)> MatrixExport<F> {
    pub fn new(emit: F) -> Self {
        MatrixExport { emit, chunk_size: CHUNK_SIZE }
    }

    pub fn with_chunk_size(emit: F, chunk_size: usize) -> Self {
        MatrixExport { emit, chunk_size: chunk_size.max(1) }
    }

    fn column(&mut self, col: u32, values: &[f64]) {
        (self.emit)(ExportMessage::MatrixCol { col });
        for (i, chunk) in values.chunks(self.chunk_size).enumerate() {
            (self.emit)(ExportMessage::SetMatrix {
                offset: i * self.chunk_size,
                values: chunk.to_vec(),
            });
        }
    }
}

impl<F: FnMut(ExportMessage)> ExportSink for MatrixExport<F> {
    fn send(&mut self, id: BufferId, xs: &[f64], ys: &[f64]) {
        (self.emit)(ExportMessage::BufferIndex { id });
        self.column(X_COLUMN, xs);
        self.column(Y_COLUMN, ys);
        (self.emit)(ExportMessage::Refresh);
    }
}

/// `track` with each record extended by its point's current (x, y), in
/// record order.
pub fn append_layout(track: &Track, corpus: &Corpus) -> Result<Track, CorpusError> {
    track
        .iter()
        .map(|(&id, records)| {
            let (xs, ys) = corpus.buffer_positions(id)?;
            if xs.len() != records.len() {
                return Err(CorpusError::LayoutMismatch { buffer: id, expected: records.len(), actual: xs.len() });
            }
            let records: Vec<Vec<f64>> = records
                .iter()
                .zip_eq(xs.into_iter().zip(ys))
                .map(|(record, (x, y))| {
                    let mut record = record.clone();
                    record.extend([x, y]);
                    record
                })
                .collect();
            Ok((id, records))
        })
        .collect()
}
