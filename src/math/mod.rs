pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Relative area below which a boolean-op fragment is treated as a sliver.
pub const SLIVER_RATIO: f64 = 1e-9;

/// Relative distance within which two boundaries count as touching.
///
/// Scaled by the extent of the shapes compared. Clipper output drifts by a
/// few 1e-9 on unit-sized input, well inside this band.
pub const SNAP_RATIO: f64 = 1e-7;
