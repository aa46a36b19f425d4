use geo::{Area, BooleanOps, Intersects};

use super::{boxes_touch, ensure_valid, snap_tolerance, GeometryKernel};
use crate::error::GeometryError;
use crate::geometry::Polygon;
use crate::math::polygon_2d::ring_gap;
use crate::math::SLIVER_RATIO;

/// General-purpose kernel backed by `geo` polygon clipping.
///
/// Fragments smaller than [`SLIVER_RATIO`] of the input area are treated as
/// numerical noise from the clipper and discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClippingKernel;

impl ClippingKernel {
    /// Creates a new clipping kernel.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GeometryKernel for ClippingKernel {
    fn difference_parts(&self, a: &Polygon, b: &Polygon) -> Result<Vec<Polygon>, GeometryError> {
        ensure_valid(a, "minuend")?;
        ensure_valid(b, "subtrahend")?;

        let threshold = a.area() * SLIVER_RATIO;
        let result = a.to_geo().difference(&b.to_geo());
        let mut parts = Vec::with_capacity(result.0.len());
        for part in &result.0 {
            if part.unsigned_area() <= threshold {
                continue;
            }
            let hole = part.interiors().iter().any(|ring| {
                geo::Polygon::new(ring.clone(), vec![]).unsigned_area() > threshold
            });
            if hole {
                return Err(GeometryError::Unrepresentable(
                    "difference leaves a hole in the polygon".into(),
                ));
            }
            parts.push(Polygon::from_geo(part));
        }
        Ok(parts)
    }

    fn overlaps(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError> {
        ensure_valid(a, "first polygon")?;
        ensure_valid(b, "second polygon")?;
        let (Some(box_a), Some(box_b)) = (a.bounding_box(), b.bounding_box()) else {
            return Ok(false);
        };
        if !boxes_touch(&box_a, &box_b, 0.0) {
            return Ok(false);
        }
        let shared = a.to_geo().intersection(&b.to_geo()).unsigned_area();
        Ok(shared > a.area().min(b.area()) * SLIVER_RATIO)
    }

    fn disjoint(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError> {
        ensure_valid(a, "first polygon")?;
        ensure_valid(b, "second polygon")?;
        let (Some(box_a), Some(box_b)) = (a.bounding_box(), b.bounding_box()) else {
            return Ok(true);
        };
        let tolerance = snap_tolerance(&box_a, &box_b);
        if !boxes_touch(&box_a, &box_b, tolerance) {
            return Ok(true);
        }
        if a.to_geo().intersects(&b.to_geo()) {
            return Ok(false);
        }
        // Clipped boundaries can miss each other by rounding noise.
        Ok(ring_gap(a.points(), b.points()) > tolerance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::rectangle(x, y, x + size, y + size)
    }

    #[test]
    fn difference_of_overlapping_squares() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        let b = Polygon::rectangle(0.5, 0.0, 1.5, 1.0);
        let diff = kernel.difference(&a, &b).unwrap().unwrap();
        assert_relative_eq!(diff.area(), 0.5, epsilon = 1e-6);
        let aabb = diff.bounding_box().unwrap();
        assert_relative_eq!(aabb.max.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn difference_of_disjoint_keeps_minuend() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        let diff = kernel.difference(&a, &b).unwrap().unwrap();
        assert_relative_eq!(diff.area(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn difference_fully_covered_is_none() {
        let kernel = ClippingKernel::new();
        let a = square(1.0, 1.0, 1.0);
        let b = square(0.0, 0.0, 4.0);
        assert!(kernel.difference(&a, &b).unwrap().is_none());
    }

    #[test]
    fn difference_with_hole_is_unrepresentable() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 4.0);
        let b = square(1.0, 1.0, 1.0);
        let err = kernel.difference(&a, &b).unwrap_err();
        assert!(matches!(err, GeometryError::Unrepresentable(_)));
    }

    #[test]
    fn difference_splitting_in_two_reports_parts() {
        let kernel = ClippingKernel::new();
        let a = Polygon::rectangle(0.0, 0.0, 3.0, 1.0);
        let bar = Polygon::rectangle(1.0, -1.0, 2.0, 2.0);
        assert_eq!(kernel.difference_parts(&a, &bar).unwrap().len(), 2);
        assert!(matches!(
            kernel.difference(&a, &bar).unwrap_err(),
            GeometryError::Unrepresentable(_)
        ));
    }

    #[test]
    fn difference_rejects_degenerate_input() {
        let kernel = ClippingKernel::new();
        let line = Polygon::from_xy(&[(0.0, 0.0), (1.0, 1.0)]);
        let err = kernel.difference(&line, &square(0.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate(_)));
    }

    #[test]
    fn overlap_requires_shared_interior() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        assert!(kernel.overlaps(&a, &Polygon::rectangle(0.5, 0.0, 1.5, 1.0)).unwrap());
        assert!(!kernel.overlaps(&a, &square(1.0, 0.0, 1.0)).unwrap());
        assert!(!kernel.overlaps(&a, &square(3.0, 3.0, 1.0)).unwrap());
        // Containment shares interior too.
        assert!(kernel.overlaps(&square(0.0, 0.0, 4.0), &a).unwrap());
    }

    #[test]
    fn disjoint_counts_boundary_contact() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        assert!(!kernel.disjoint(&a, &square(1.0, 1.0, 1.0)).unwrap());
        assert!(!kernel.disjoint(&a, &square(0.5, 0.5, 1.0)).unwrap());
        assert!(kernel.disjoint(&a, &square(1.5, 0.0, 1.0)).unwrap());
    }

    #[test]
    fn rounding_gap_still_touches() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        let b = Polygon::from_xy(&[(1.0 + 4e-9, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0 + 3e-9, 1.0)]);
        assert!(!kernel.disjoint(&a, &b).unwrap());
        assert!(kernel.borders(&a, &b).unwrap());
        assert!(!kernel.overlaps(&a, &b).unwrap());

        // Near-corner contact touches without bordering.
        let corner = square(1.0 + 4e-9, 1.0 + 4e-9, 1.0);
        assert!(!kernel.disjoint(&a, &corner).unwrap());
        assert!(!kernel.borders(&a, &corner).unwrap());

        assert!(kernel.disjoint(&a, &square(1.001, 0.0, 1.0)).unwrap());
    }

    #[test]
    fn borders_accepts_shared_edges_only() {
        let kernel = ClippingKernel::new();
        let a = square(0.0, 0.0, 1.0);
        assert!(kernel.borders(&a, &square(1.0, 0.0, 1.0)).unwrap());
        assert!(!kernel.borders(&a, &square(1.0, 1.0, 1.0)).unwrap());
        assert!(kernel.borders(&a, &Polygon::rectangle(0.5, 0.5, 2.0, 2.0)).unwrap());
    }

    #[test]
    fn triangle_against_square() {
        let kernel = ClippingKernel::new();
        let tri = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
        let sq = square(1.0, 1.0, 1.0);
        // The hypotenuse only touches the square's corner.
        assert!(!kernel.overlaps(&tri, &sq).unwrap());
        assert!(!kernel.disjoint(&tri, &sq).unwrap());
    }
}
