//! Polygon predicates and boolean difference behind a swappable interface.

mod axis_aligned;
mod clipping;

pub use axis_aligned::AxisAlignedKernel;
pub use clipping::ClippingKernel;

use crate::error::GeometryError;
use crate::geometry::{Aabb, Polygon};
use crate::math::polygon_2d::{collinear_overlap, ring_edges};
use crate::math::SNAP_RATIO;

/// The geometric operations the graph pipeline relies on.
///
/// All comparisons happen in internal units; scaling is a serialization
/// concern and never reaches the kernel.
pub trait GeometryKernel {
    /// Bounding box of a polygon.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the ring has no vertices.
    fn bounding_box(&self, polygon: &Polygon) -> Result<Aabb, GeometryError> {
        polygon
            .bounding_box()
            .ok_or_else(|| GeometryError::Degenerate("empty ring has no bounding box".into()))
    }

    /// Every hole-free part of `a \ b`, in the order the backend produces them.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` if either input is degenerate or a part of
    /// the result has a hole.
    fn difference_parts(&self, a: &Polygon, b: &Polygon) -> Result<Vec<Polygon>, GeometryError>;

    /// `a \ b` as a single ring, or `None` when nothing remains.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` if either input is degenerate, or if the
    /// result has holes or falls apart into several parts.
    fn difference(&self, a: &Polygon, b: &Polygon) -> Result<Option<Polygon>, GeometryError> {
        let mut parts = self.difference_parts(a, b)?;
        match parts.len() {
            0 => Ok(None),
            1 => Ok(parts.pop()),
            n => Err(GeometryError::Unrepresentable(format!(
                "difference splits the polygon into {n} parts"
            ))),
        }
    }

    /// `true` iff the polygons share interior area.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` for degenerate input.
    fn overlaps(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError>;

    /// `true` iff the polygons share no point, interior or boundary.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` for degenerate input.
    fn disjoint(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError>;

    /// `true` iff the polygons overlap or their boundaries run along each
    /// other for a positive length. Corner contact does not count.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` for degenerate input.
    fn borders(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError> {
        if self.overlaps(a, b)? {
            return Ok(true);
        }
        Ok(shares_boundary(a, b))
    }
}

/// Rejects rings that cannot bound an area.
pub(crate) fn ensure_valid(polygon: &Polygon, role: &str) -> Result<(), GeometryError> {
    if polygon.is_degenerate() {
        return Err(GeometryError::Degenerate(format!(
            "{role} has {} distinct vertices and area {}",
            polygon.vertex_count(),
            polygon.area()
        )));
    }
    Ok(())
}

/// `true` if the boxes intersect or lie within `margin` of each other.
pub(crate) fn boxes_touch(a: &Aabb, b: &Aabb, margin: f64) -> bool {
    a.min.x <= b.max.x + margin
        && b.min.x <= a.max.x + margin
        && a.min.y <= b.max.y + margin
        && b.min.y <= a.max.y + margin
}

/// Distance below which two boundaries are treated as coincident.
pub(crate) fn snap_tolerance(a: &Aabb, b: &Aabb) -> f64 {
    let extent = a.width().max(a.height()).max(b.width()).max(b.height());
    extent * SNAP_RATIO
}

/// `true` if some edge of `a` and some edge of `b` overlap collinearly.
fn shares_boundary(a: &Polygon, b: &Polygon) -> bool {
    let (Some(box_a), Some(box_b)) = (a.bounding_box(), b.bounding_box()) else {
        return false;
    };
    let tolerance = snap_tolerance(&box_a, &box_b);
    if !boxes_touch(&box_a, &box_b, tolerance) {
        return false;
    }
    ring_edges(a.points()).any(|(a0, a1)| {
        ring_edges(b.points()).any(|(b0, b1)| collinear_overlap(a0, a1, b0, b1, tolerance))
    })
}
