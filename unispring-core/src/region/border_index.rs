//! Uniform-grid nearest-neighbor index over border samples.
//!
//! Samples are bucketed by `floor((p - origin) / cell_size)`. A k-nearest query
//! walks Chebyshev rings of cells outward from the query's cell and stops as
//! soon as the k-th best distance is closer than anything an unvisited ring
//! could hold. Queries far outside the grid skip straight over empty rings, so
//! containment tests against points well outside the region stay cheap.
//!
//! The index is immutable: a region rebuilds it wholesale when its outline
//! changes.

use crate::geometry::{BoundingBox, R2};

/// Cell coordinates are clamped so ring arithmetic cannot overflow.
const MAX_CELL: i64 = 1 << 40;

#[derive(Clone, Debug)]
pub struct BorderIndex {
    points: Vec<R2<f64>>,
    origin: R2<f64>,
    cell_size: f64,
    cols: i64,
    rows: i64,
    cells: Vec<Vec<usize>>,
}

impl BorderIndex {
    pub fn new(points: Vec<R2<f64>>) -> Self {
        let bbox = BoundingBox::of(&points).unwrap_or_else(BoundingBox::unit);
        let extent = bbox.width().max(bbox.height());
        let n = points.len().max(1) as f64;
        let cell_size = if extent > 0. && extent.is_finite() {
            extent / n.sqrt()
        } else {
            1.
        };
        let cols = (bbox.width() / cell_size).floor() as i64 + 1;
        let rows = (bbox.height() / cell_size).floor() as i64 + 1;
        let mut index = BorderIndex {
            points: Vec::new(),
            origin: bbox.min,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); (cols * rows) as usize],
        };
        for (idx, p) in points.iter().enumerate() {
            let (cx, cy) = index.cell_of(p);
            let cx = cx.clamp(0, cols - 1);
            let cy = cy.clamp(0, rows - 1);
            index.cells[(cy * cols + cx) as usize].push(idx);
        }
        index.points = points;
        index
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, idx: usize) -> R2<f64> {
        self.points[idx]
    }

    fn cell_of(&self, p: &R2<f64>) -> (i64, i64) {
        let key = |v: f64, o: f64| (((v - o) / self.cell_size).floor() as i64).clamp(-MAX_CELL, MAX_CELL);
        (key(p.x, self.origin.x), key(p.y, self.origin.y))
    }

    /// The `k` samples nearest to `q`, as `(sample index, distance)` sorted by distance.
    ///
    /// Returns fewer than `k` entries only when the index holds fewer than `k`
    /// samples, and nothing for a non-finite query.
    pub fn nearest(&self, q: &R2<f64>, k: usize) -> Vec<(usize, f64)> {
        let mut best: Vec<(usize, f64)> = Vec::with_capacity(k + 1);
        if k == 0 || self.points.is_empty() || !q.is_finite() {
            return best;
        }
        let (qx, qy) = self.cell_of(q);
        let min_ring = [-qx, qx - (self.cols - 1), -qy, qy - (self.rows - 1), 0]
            .into_iter()
            .max()
            .unwrap_or(0);
        let max_ring = [qx, self.cols - 1 - qx, qy, self.rows - 1 - qy]
            .iter()
            .map(|d| d.abs())
            .max()
            .unwrap_or(0);

        for ring in min_ring..=max_ring {
            let x_lo = (qx - ring).max(0);
            let x_hi = (qx + ring).min(self.cols - 1);
            let y_lo = (qy - ring).max(0);
            let y_hi = (qy + ring).min(self.rows - 1);
            if x_lo <= x_hi && y_lo <= y_hi {
                for cx in x_lo..=x_hi {
                    if (cx - qx).abs() == ring {
                        for cy in y_lo..=y_hi {
                            self.visit(cx, cy, q, k, &mut best);
                        }
                    } else {
                        for cy in [qy - ring, qy + ring] {
                            if y_lo <= cy && cy <= y_hi {
                                self.visit(cx, cy, q, k, &mut best);
                            }
                        }
                    }
                }
            }
            // Unvisited cells are at least `ring` cells away from the query's cell.
            if best.len() == k && best[k - 1].1 <= ring as f64 * self.cell_size {
                break;
            }
        }
        best
    }

    fn visit(&self, cx: i64, cy: i64, q: &R2<f64>, k: usize, best: &mut Vec<(usize, f64)>) {
        for &idx in &self.cells[(cy * self.cols + cx) as usize] {
            let dist = self.points[idx].distance(q);
            if best.len() == k && dist >= best[k - 1].1 {
                continue;
            }
            let pos = best.partition_point(|(_, d)| *d <= dist);
            best.insert(pos, (idx, dist));
            best.truncate(k);
        }
    }
}
