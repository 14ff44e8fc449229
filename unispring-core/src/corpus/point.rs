use std::collections::BTreeSet;

use crate::geometry::R2;

/// A point of the layout.
///
/// `neighbors` holds arena indices of the points it shares a Delaunay edge
/// with; it is rebuilt on every triangulation and cleared when a relaxation
/// ends. `push` is the displacement accumulated during the current step and
/// is zero between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub position: R2<f64>,
    /// Position at the last triangulation, for measuring drift.
    pub origin: R2<f64>,
    pub push: R2<f64>,
    pub neighbors: BTreeSet<usize>,
    pub reference: Option<R2<f64>>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        let position = R2::new(x, y);
        Point {
            position,
            origin: position,
            push: R2::zero(),
            neighbors: BTreeSet::new(),
            reference: None,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn distance_to(&self, o: &Point) -> f64 {
        self.position.distance(&o.position)
    }

    pub fn midpoint(&self, o: &Point) -> R2<f64> {
        self.position.midpoint(&o.position)
    }

    /// Replace the pending displacement with one landing exactly on `target`.
    pub fn move_to(&mut self, target: R2<f64>) {
        self.push = target - self.position;
    }

    /// Apply the pending displacement.
    pub fn update(&mut self) {
        self.position += self.push;
        self.push = R2::zero();
    }

    pub fn update_origin(&mut self) {
        self.origin = self.position;
    }

    /// Distance moved since the last triangulation.
    pub fn drift(&self) -> f64 {
        self.position.distance(&self.origin)
    }
}
