//! Exploration regions: where points are allowed to end up.
//!
//! A [`Region`] answers four questions for the relaxation engine: its area
//! (which sets the rest length), its bounding box (where points are seeded),
//! whether a point *would* still be inside after a proposed displacement, and
//! which border point to snap it to when it would not.

mod border_index;
mod circle;
mod polygon;

pub use border_index::BorderIndex;
pub use circle::CircleRegion;
pub use polygon::{BorderSample, Edge, PolygonRegion};

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::{
    error::RegionError,
    geometry::{BoundingBox, R2},
};

/// Border samples per unit length of polygon edge.
pub const DEFAULT_BORDER_DENSITY: f64 = 50.;

/// Tolerance of the edge half-plane test, on the sine of the angle between the
/// edge and the vector to the tested point.
pub const INSIDE_EPSILON: f64 = 1e-5;

/// Result of a containment query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Containment {
    pub inside: bool,
    /// Border point nearest to the tested position.
    pub nearest: R2<f64>,
}

#[derive(Debug, Clone, From)]
pub enum Region {
    Polygon(PolygonRegion),
    Circle(CircleRegion),
}

impl Region {
    pub fn polygon(vertices: Vec<R2<f64>>) -> Result<Region, RegionError> {
        Ok(Region::Polygon(PolygonRegion::new(vertices, DEFAULT_BORDER_DENSITY)?))
    }

    pub fn circle(center: R2<f64>, radius: f64) -> Result<Region, RegionError> {
        Ok(Region::Circle(CircleRegion::new(center, radius)?))
    }

    /// Unit square `(0,0) (1,0) (1,1) (0,1)`.
    pub fn unit_square() -> Result<Region, RegionError> {
        Region::polygon(vec![
            R2::new(0., 0.),
            R2::new(1., 0.),
            R2::new(1., 1.),
            R2::new(0., 1.),
        ])
    }

    pub fn area(&self) -> f64 {
        match self {
            Region::Polygon(p) => p.area(),
            Region::Circle(c) => c.area(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Region::Polygon(p) => p.bounding_box(),
            Region::Circle(c) => c.bounding_box(),
        }
    }

    pub fn barycenter(&self) -> R2<f64> {
        match self {
            Region::Polygon(p) => p.barycenter(),
            Region::Circle(c) => c.barycenter(),
        }
    }

    /// Whether `position + displacement` lies inside, and the border point
    /// nearest to it.
    pub fn containment(&self, position: &R2<f64>, displacement: &R2<f64>) -> Containment {
        match self {
            Region::Polygon(p) => p.containment(position, displacement),
            Region::Circle(c) => c.containment(position, displacement),
        }
    }

    pub fn contains(&self, position: &R2<f64>) -> bool {
        self.containment(position, &R2::zero()).inside
    }

    pub fn nearest_border(&self, q: &R2<f64>) -> R2<f64> {
        match self {
            Region::Polygon(p) => p.nearest_border(q),
            Region::Circle(c) => c.nearest_border(q),
        }
    }

    /// Square inscribed around the barycenter, as `(side, lower-left corner)`.
    pub fn inscribed_square(&self) -> (f64, R2<f64>) {
        match self {
            Region::Polygon(p) => p.inscribed_square(),
            Region::Circle(c) => c.inscribed_square(),
        }
    }

    pub fn spec(&self) -> RegionSpec {
        match self {
            Region::Polygon(p) => RegionSpec::Polygon {
                vertices: p.vertices().to_vec(),
                density: p.density(),
            },
            Region::Circle(c) => RegionSpec::Circle { center: c.center, radius: c.radius },
        }
    }
}

fn default_border_density() -> f64 {
    DEFAULT_BORDER_DENSITY
}

/// Serializable region description, as received from a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RegionSpec {
    Polygon {
        vertices: Vec<R2<f64>>,
        #[serde(default = "default_border_density")]
        density: f64,
    },
    Circle {
        center: R2<f64>,
        radius: f64,
    },
}

impl RegionSpec {
    pub fn build(&self) -> Result<Region, RegionError> {
        match self {
            RegionSpec::Polygon { vertices, density } => {
                Ok(Region::Polygon(PolygonRegion::new(vertices.clone(), *density)?))
            }
            RegionSpec::Circle { center, radius } => Region::circle(*center, *radius),
        }
    }
}

impl TryFrom<RegionSpec> for Region {
    type Error = RegionError;
    fn try_from(spec: RegionSpec) -> Result<Self, Self::Error> {
        spec.build()
    }
}

#[cfg(test)]
mod tests;
