use std::f64::consts::PI;

use crate::{
    error::RegionError,
    geometry::{BoundingBox, R2},
};

use super::Containment;

/// Slack on the radius comparison, so points snapped onto the circle stay inside.
const RADIUS_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleRegion {
    pub center: R2<f64>,
    pub radius: f64,
}

impl CircleRegion {
    pub fn new(center: R2<f64>, radius: f64) -> Result<Self, RegionError> {
        if !(radius > 0.) || !radius.is_finite() {
            return Err(RegionError::NonPositiveRadius(radius));
        }
        Ok(CircleRegion { center, radius })
    }

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let r = R2::new(self.radius, self.radius);
        BoundingBox::new(self.center - r, self.center + r)
    }

    pub fn barycenter(&self) -> R2<f64> {
        self.center
    }

    /// Point where the ray from the center through `q` meets the circle.
    pub fn nearest_border(&self, q: &R2<f64>) -> R2<f64> {
        self.center + R2::polar(self.radius, self.center.angle_to(q))
    }

    pub fn containment(&self, position: &R2<f64>, displacement: &R2<f64>) -> Containment {
        let candidate = *position + *displacement;
        Containment {
            inside: self.center.distance(&candidate) <= self.radius + RADIUS_EPSILON,
            nearest: self.nearest_border(&candidate),
        }
    }

    pub fn inscribed_square(&self) -> (f64, R2<f64>) {
        let origin = self.center + R2::polar(self.radius, (-1_f64).atan2(-1.));
        let side = 2. * self.radius / 2_f64.sqrt();
        (side, origin)
    }
}
