use std::{ops::{Sub, Mul, Add, Div, Neg, AddAssign}, fmt::{Display, Formatter, self}};
use approx::{AbsDiffEq, RelativeEq};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct R2<D> {
    pub x: D,
    pub y: D,
}

impl<D: Display> Display for R2<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl<D> From<(D, D)> for R2<D> {
    fn from((x, y): (D, D)) -> Self {
        R2 { x, y }
    }
}

impl R2<f64> {
    pub fn new(x: f64, y: f64) -> Self {
        R2 { x, y }
    }

    pub fn zero() -> Self {
        R2 { x: 0., y: 0. }
    }

    pub fn norm2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    pub fn distance(&self, o: &R2<f64>) -> f64 {
        (*o - *self).norm()
    }

    /// Angle of the vector from `self` to `o`.
    pub fn angle_to(&self, o: &R2<f64>) -> f64 {
        (o.y - self.y).atan2(o.x - self.x)
    }

    pub fn midpoint(&self, o: &R2<f64>) -> R2<f64> {
        R2 { x: (self.x + o.x) / 2., y: (self.y + o.y) / 2. }
    }

    /// Vector of length `r` at angle `theta`.
    pub fn polar(r: f64, theta: f64) -> R2<f64> {
        R2 { x: r * theta.cos(), y: r * theta.sin() }
    }

    pub fn dot(&self, o: &R2<f64>) -> f64 {
        self.x * o.x + self.y * o.y
    }

    /// z-component of the 3-D cross product.
    pub fn cross(&self, o: &R2<f64>) -> f64 {
        self.x * o.y - self.y * o.x
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl AbsDiffEq for R2<f64> {
    type Epsilon = f64;
    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for R2<f64> {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative) && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}

impl<D: Add<Output = D>> Add for R2<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<D: AddAssign> AddAssign for R2<D> {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl<D: Sub<Output = D>> Sub for R2<D> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<D: Neg<Output = D>> Neg for R2<D> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        R2 { x: -self.x, y: -self.y }
    }
}

impl<D: Mul<D, Output = D> + Clone> Mul<D> for R2<D> {
    type Output = Self;
    fn mul(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x * rhs.clone(),
            y: self.y * rhs,
        }
    }
}

impl<D: Div<D, Output = D> + Clone> Div<D> for R2<D> {
    type Output = Self;
    fn div(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x / rhs.clone(),
            y: self.y / rhs,
        }
    }
}
