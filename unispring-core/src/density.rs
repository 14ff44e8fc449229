//! Target-density fields.
//!
//! A density scales the local rest length between two neighbors: the target
//! length of a pair is `h_scale / density(midpoint)`, so points pack tighter
//! where the density is high.

use serde::{Deserialize, Serialize};

use crate::{
    error::CorpusError,
    geometry::{BoundingBox, R2},
};

fn default_mean() -> R2<f64> {
    R2::new(0.5, 0.5)
}

fn default_variance() -> f64 {
    0.02
}

fn default_floor() -> f64 {
    1.
}

fn unit_bounds() -> BoundingBox {
    BoundingBox::unit()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Density {
    /// Same target spacing everywhere.
    #[default]
    Uniform,
    /// `1 + N(p)/N(mean)` for an isotropic normal: 2 at the peak, tending to 1 away from it.
    Gaussian(GaussianBump),
    /// `1 + x`
    Linear,
    /// Nearest-cell lookup into a histogram, e.g. of exploration history.
    Table(HistogramTable),
}

impl Density {
    pub fn gaussian() -> Density {
        Density::Gaussian(GaussianBump::default())
    }

    pub fn at(&self, p: &R2<f64>) -> f64 {
        match self {
            Density::Uniform => 1.,
            Density::Gaussian(bump) => bump.at(p),
            Density::Linear => 1. + p.x,
            Density::Table(table) => table.at(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GaussianSpec {
    #[serde(default = "default_mean")]
    mean: R2<f64>,
    #[serde(default = "default_variance")]
    variance: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GaussianSpec", rename_all = "camelCase")]
pub struct GaussianBump {
    mean: R2<f64>,
    variance: f64,
}

impl TryFrom<GaussianSpec> for GaussianBump {
    type Error = CorpusError;
    fn try_from(spec: GaussianSpec) -> Result<Self, Self::Error> {
        GaussianBump::new(spec.mean, spec.variance)
    }
}

impl Default for GaussianBump {
    fn default() -> Self {
        GaussianBump { mean: default_mean(), variance: default_variance() }
    }
}

impl GaussianBump {
    pub fn new(mean: R2<f64>, variance: f64) -> Result<Self, CorpusError> {
        if !(variance > 0.) || !variance.is_finite() {
            return Err(CorpusError::InvalidParameter { name: "variance", value: variance });
        }
        for value in [mean.x, mean.y] {
            if !value.is_finite() {
                return Err(CorpusError::InvalidParameter { name: "mean", value });
            }
        }
        Ok(GaussianBump { mean, variance })
    }

    pub fn mean(&self) -> R2<f64> {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn at(&self, p: &R2<f64>) -> f64 {
        1. + (-(*p - self.mean).norm2() / (2. * self.variance)).exp()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableSpec {
    counts: Vec<Vec<f64>>,
    #[serde(default = "unit_bounds")]
    bounds: BoundingBox,
    #[serde(default = "default_floor")]
    floor: f64,
}

/// Row-major histogram (`counts[row][col]`, rows along y, columns along x)
/// covering `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableSpec", rename_all = "camelCase")]
pub struct HistogramTable {
    counts: Vec<Vec<f64>>,
    bounds: BoundingBox,
    floor: f64,
    #[serde(skip_serializing)]
    max: f64,
}

impl TryFrom<TableSpec> for HistogramTable {
    type Error = CorpusError;
    fn try_from(spec: TableSpec) -> Result<Self, Self::Error> {
        HistogramTable::with_bounds(spec.counts, spec.bounds, spec.floor)
    }
}

impl HistogramTable {
    /// Table over the unit square, with floor 1.
    pub fn new(counts: Vec<Vec<f64>>) -> Result<Self, CorpusError> {
        HistogramTable::with_bounds(counts, BoundingBox::unit(), default_floor())
    }

    pub fn with_bounds(counts: Vec<Vec<f64>>, bounds: BoundingBox, floor: f64) -> Result<Self, CorpusError> {
        let cols = counts.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(CorpusError::InvalidTable("table is empty".to_string()));
        }
        if let Some(row) = counts.iter().position(|r| r.len() != cols) {
            return Err(CorpusError::InvalidTable(format!("row {} has {} cells, expected {}", row, counts[row].len(), cols)));
        }
        if counts.iter().flatten().any(|c| !(*c >= 0.) || !c.is_finite()) {
            return Err(CorpusError::InvalidTable("counts must be finite and non-negative".to_string()));
        }
        if !(floor > 0.) || !floor.is_finite() {
            return Err(CorpusError::InvalidTable(format!("floor must be positive, got {}", floor)));
        }
        if !(bounds.width() > 0.) || !(bounds.height() > 0.) {
            return Err(CorpusError::InvalidTable("bounds must have positive width and height".to_string()));
        }
        let max = counts.iter().flatten().cloned().fold(0., f64::max);
        if max == 0. {
            return Err(CorpusError::InvalidTable("all counts are zero".to_string()));
        }
        Ok(HistogramTable { counts, bounds, floor, max })
    }

    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    pub fn cols(&self) -> usize {
        self.counts[0].len()
    }

    /// `floor + count / max` of the cell containing `p`, clamped to the table.
    pub fn at(&self, p: &R2<f64>) -> f64 {
        let cell = |v: f64, lo: f64, extent: f64, n: usize| {
            let idx = ((v - lo) / extent * n as f64).floor();
            if idx.is_nan() {
                0
            } else {
                (idx.max(0.) as usize).min(n - 1)
            }
        };
        let col = cell(p.x, self.bounds.min.x, self.bounds.width(), self.cols());
        let row = cell(p.y, self.bounds.min.y, self.bounds.height(), self.rows());
        self.floor + self.counts[row][col] / self.max
    }
}
