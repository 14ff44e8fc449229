use std::fmt::Display;

use itertools::Itertools;
use log::debug;

use crate::{
    error::RegionError,
    geometry::{BoundingBox, R2},
};

use super::{border_index::BorderIndex, Containment, INSIDE_EPSILON};

/// Directed polygon edge; the region interior lies on its left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub start: R2<f64>,
    pub end: R2<f64>,
}

impl Edge {
    pub fn new(start: R2<f64>, end: R2<f64>) -> Self {
        Edge { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Evenly spaced samples from `start` (inclusive) towards `end` (exclusive),
    /// `density` per unit length, at least one.
    pub fn segment(&self, density: f64) -> Vec<R2<f64>> {
        let n = ((self.length() * density) as usize).max(1);
        let step = (self.end - self.start) / n as f64;
        (0..n).map(|i| self.start + step * i as f64).collect()
    }

    /// Half-plane test: `sin(edgeAngle - angleToPoint) < ε`, i.e. `q` is on the
    /// interior side of the edge's supporting line, or on it.
    pub fn is_inside_side(&self, q: &R2<f64>) -> bool {
        let e = self.end - self.start;
        let v = *q - self.start;
        let scale = e.norm() * v.norm();
        if scale == 0. {
            return true;
        }
        v.cross(&e) / scale < INSIDE_EPSILON
    }

    /// Whether two segments share any point, touching and collinear overlap
    /// included. Only meaningful for edges that are not neighbors in the outline.
    fn meets(&self, o: &Edge) -> bool {
        let d1 = o.side(&self.start);
        let d2 = o.side(&self.end);
        let d3 = self.side(&o.start);
        let d4 = self.side(&o.end);
        let straddles = |a: f64, b: f64| (a > 0. && b < 0.) || (a < 0. && b > 0.);
        if straddles(d1, d2) && straddles(d3, d4) {
            return true;
        }
        (d1 == 0. && o.spans(&self.start))
            || (d2 == 0. && o.spans(&self.end))
            || (d3 == 0. && self.spans(&o.start))
            || (d4 == 0. && self.spans(&o.end))
    }

    /// `p` lies within the edge's bounding box; combined with a zero `side`, on the edge.
    fn spans(&self, p: &R2<f64>) -> bool {
        p.x >= self.start.x.min(self.end.x)
            && p.x <= self.start.x.max(self.end.x)
            && p.y >= self.start.y.min(self.end.y)
            && p.y <= self.start.y.max(self.end.y)
    }

    fn side(&self, p: &R2<f64>) -> f64 {
        (self.end - self.start).cross(&(*p - self.start))
    }
}

/// A border sample and the index of the edge that generated it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BorderSample {
    pub position: R2<f64>,
    pub edge: usize,
}

/// Simple polygon, densely sampled along its border for containment queries.
#[derive(Debug, Clone)]
pub struct PolygonRegion {
    vertices: Vec<R2<f64>>,
    edges: Vec<Edge>,
    samples: Vec<BorderSample>,
    index: BorderIndex,
    density: f64,
}

impl PolygonRegion {
    /// Validate the outline, orient it counter-clockwise, sample its border at
    /// `density` points per unit length and index the samples.
    pub fn new(vertices: Vec<R2<f64>>, density: f64) -> Result<Self, RegionError> {
        let count = vertices.len();
        if count < 3 {
            return Err(RegionError::TooFewVertices { count });
        }
        if !(density > 0.) || !density.is_finite() {
            return Err(RegionError::NonPositiveDensity(density));
        }
        let raw = outline(&vertices);
        if let Some(index) = raw.iter().position(|e| e.length() == 0.) {
            return Err(RegionError::DegenerateEdge { index });
        }
        if let Some((first, second)) = first_crossing(&raw) {
            return Err(RegionError::SelfIntersecting { first, second });
        }
        let mut vertices = vertices;
        let signed = shoelace(&vertices);
        if signed == 0. || !signed.is_finite() {
            return Err(RegionError::ZeroArea);
        }
        if signed < 0. {
            vertices.reverse();
        }
        let edges = outline(&vertices);

        let samples: Vec<BorderSample> = edges
            .iter()
            .enumerate()
            .flat_map(|(edge, e)| {
                e.segment(density)
                    .into_iter()
                    .map(move |position| BorderSample { position, edge })
            })
            .collect();
        let index = BorderIndex::new(samples.iter().map(|s| s.position).collect());
        debug!("polygon region: {} vertices, {} border samples", vertices.len(), samples.len());
        Ok(PolygonRegion { vertices, edges, samples, index, density })
    }

    pub fn vertices(&self) -> &[R2<f64>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn samples(&self) -> &[BorderSample] {
        &self.samples
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Signed shoelace area; positive since vertices are stored counter-clockwise.
    pub fn area(&self) -> f64 {
        shoelace(&self.vertices)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // `new` guarantees at least 3 vertices.
        BoundingBox::of(&self.vertices).unwrap_or_else(BoundingBox::unit)
    }

    pub fn barycenter(&self) -> R2<f64> {
        let n = self.vertices.len() as f64;
        let sum = self.vertices.iter().fold(R2::zero(), |acc, v| acc + *v);
        sum / n
    }

    /// Tests `position + displacement` against the edges of its 2 nearest border
    /// samples; both must report the interior side.
    pub fn containment(&self, position: &R2<f64>, displacement: &R2<f64>) -> Containment {
        let candidate = *position + *displacement;
        let nearest = self.index.nearest(&candidate, 2);
        match nearest.first() {
            None => Containment { inside: false, nearest: self.barycenter() },
            Some(&(closest, _)) => {
                let inside = nearest
                    .iter()
                    .all(|(idx, _)| self.edges[self.samples[*idx].edge].is_inside_side(&candidate));
                Containment { inside, nearest: self.samples[closest].position }
            }
        }
    }

    /// Nearest border sample; the barycenter for a non-finite query.
    pub fn nearest_border(&self, q: &R2<f64>) -> R2<f64> {
        self.index
            .nearest(q, 1)
            .first()
            .map(|(idx, _)| self.index.point(*idx))
            .unwrap_or_else(|| self.barycenter())
    }

    /// Axis-aligned square centered on the barycenter whose half-diagonal reaches
    /// the nearest border sample. Returns `(side, lower-left corner)`.
    pub fn inscribed_square(&self) -> (f64, R2<f64>) {
        let center = self.barycenter();
        let dist = self.index.nearest(&center, 1).first().map(|(_, d)| *d).unwrap_or(0.);
        let side = 2. * dist / 2_f64.sqrt();
        (side, center - R2::new(side / 2., side / 2.))
    }
}

impl Display for PolygonRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verts: Vec<String> = self.vertices.iter().map(|v| v.to_string()).collect();
        write!(f, "Polygon[{}]", verts.join(", "))
    }
}

fn outline(vertices: &[R2<f64>]) -> Vec<Edge> {
    vertices
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| Edge::new(*a, *b))
        .collect()
}

fn shoelace(vertices: &[R2<f64>]) -> f64 {
    vertices
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.cross(b))
        .sum::<f64>() / 2.
}

/// First pair of non-adjacent edges that cross, touch or overlap. A vertex
/// visited twice shows up here as two edges meeting at it.
fn first_crossing(edges: &[Edge]) -> Option<(usize, usize)> {
    let n = edges.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].meets(&edges[j]) {
                return Some((i, j));
            }
        }
    }
    None
}
