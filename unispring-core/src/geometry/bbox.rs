use serde::{Deserialize, Serialize};

use super::r2::R2;

/// Axis-aligned box given by its min and max corners.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: R2<f64>,
    pub max: R2<f64>,
}

impl BoundingBox {
    pub fn new(min: R2<f64>, max: R2<f64>) -> Self {
        BoundingBox { min, max }
    }

    pub fn unit() -> Self {
        BoundingBox { min: R2::new(0., 0.), max: R2::new(1., 1.) }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn of<'a, I: IntoIterator<Item = &'a R2<f64>>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(BoundingBox { min: first, max: first }, |bbox, p| BoundingBox {
            min: R2::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y)),
            max: R2::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y)),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> R2<f64> {
        self.min.midpoint(&self.max)
    }

    pub fn contains(&self, p: &R2<f64>) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// Box shrunk by `margin` on every side; collapses to the center rather than inverting.
    pub fn shrink(&self, margin: f64) -> Self {
        let c = self.center();
        let hx = (self.width() / 2. - margin).max(0.);
        let hy = (self.height() / 2. - margin).max(0.);
        BoundingBox {
            min: R2::new(c.x - hx, c.y - hy),
            max: R2::new(c.x + hx, c.y + hy),
        }
    }
}
