use std::collections::BTreeSet;

use log::{debug, warn};
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::{error::TriangulationError, geometry::R2};

use super::Corpus;

/// Delaunay neighbor sets of `positions`, indexed like `positions`.
///
/// A position equal to an earlier one does not get its own vertex; it is
/// linked to every earlier point at that position instead, so they still repel.
pub fn delaunay_neighbors(positions: &[R2<f64>]) -> Result<Vec<BTreeSet<usize>>, TriangulationError> {
    let count = positions.len();
    if count < 3 {
        return Err(TriangulationError::TooFewPoints { count });
    }
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    // Vertex index -> points inserted at that position, first one owning the vertex
    let mut groups: Vec<Vec<usize>> = Vec::with_capacity(count);
    let mut neighbors = vec![BTreeSet::new(); count];
    let mut coincident = 0;
    for (idx, p) in positions.iter().enumerate() {
        let handle = triangulation
            .insert(spade_point(p))
            .map_err(|e| TriangulationError::Insertion(format!("point {} at {}: {:?}", idx, p, e)))?;
        let vertex = handle.index();
        if vertex < groups.len() {
            for &other in &groups[vertex] {
                neighbors[other].insert(idx);
                neighbors[idx].insert(other);
            }
            groups[vertex].push(idx);
            coincident += 1;
        } else {
            groups.push(vec![idx]);
        }
    }
    if coincident > 0 {
        warn!("{} of {} points coincide with an earlier point", coincident, count);
    }
    if triangulation.num_inner_faces() == 0 {
        return Err(TriangulationError::Collinear { count });
    }
    for face in triangulation.inner_faces() {
        let [a, b, c] = face.vertices().map(|v| groups[v.fix().index()][0]);
        for (u, v) in [(a, b), (b, c), (c, a)] {
            neighbors[u].insert(v);
            neighbors[v].insert(u);
        }
    }
    Ok(neighbors)
}

/// `spade` rejects nonzero coordinates below `MIN_ALLOWED_VALUE`; those are
/// float residue from snapping onto an axis-aligned border and map to 0.
fn spade_point(p: &R2<f64>) -> Point2<f64> {
    let snap = |v: f64| if v.abs() < spade::MIN_ALLOWED_VALUE { 0. } else { v };
    Point2::new(snap(p.x), snap(p.y))
}

impl Corpus {
    /// Rebuild every point's neighbor set from a Delaunay triangulation of the
    /// current positions and record the positions as drift origins. Returns the
    /// number of (unordered) neighbor pairs.
    ///
    /// On failure the previous neighbor sets and origins are left in place.
    pub fn triangulate(&mut self) -> Result<usize, TriangulationError> {
        let neighbors = delaunay_neighbors(&self.positions())?;
        let mut links = 0;
        for (point, neighbors) in self.points.iter_mut().zip(neighbors) {
            links += neighbors.len();
            point.neighbors = neighbors;
            point.update_origin();
        }
        let pairs = links / 2;
        debug!("triangulated {} points: {} neighbor pairs", self.points.len(), pairs);
        Ok(pairs)
    }
}
