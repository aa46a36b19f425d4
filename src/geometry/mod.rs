pub mod polygon;
pub mod wkt;

pub use polygon::{Aabb, Polygon};
