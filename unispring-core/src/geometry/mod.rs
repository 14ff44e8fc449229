pub mod bbox;
pub mod r2;

pub use bbox::BoundingBox;
pub use r2::R2;
