use super::{ensure_valid, GeometryKernel};
use crate::error::GeometryError;
use crate::geometry::{Aabb, Polygon};
use crate::math::Point2;

/// Exact kernel restricted to axis-aligned rectangles.
///
/// Differences are supported when the subtrahend removes whole strips from
/// the minuend, which is all the splitter and the simple overlap cases need.
/// Anything else is reported as `GeometryError::Unsupported`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisAlignedKernel;

impl AxisAlignedKernel {
    /// Creates a new axis-aligned kernel.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Interprets a polygon as a rectangle, or fails if it is not one.
#[allow(clippy::float_cmp)]
fn as_rect(polygon: &Polygon, role: &str) -> Result<Aabb, GeometryError> {
    ensure_valid(polygon, role)?;
    let not_rect = || GeometryError::Unsupported(format!("{role} is not an axis-aligned rectangle"));
    if polygon.vertex_count() != 4 {
        return Err(not_rect());
    }
    let aabb = polygon.bounding_box().ok_or_else(not_rect)?;
    let on_corner = polygon.points().iter().all(|p| {
        (p.x == aabb.min.x || p.x == aabb.max.x) && (p.y == aabb.min.y || p.y == aabb.max.y)
    });
    let box_area = aabb.width() * aabb.height();
    let full = (polygon.area() - box_area).abs() <= box_area * 1e-12;
    if on_corner && full {
        Ok(aabb)
    } else {
        Err(not_rect())
    }
}

/// Intersection of two boxes with positive area, if any.
fn interior_intersection(a: &Aabb, b: &Aabb) -> Option<Aabb> {
    let min = Point2::new(a.min.x.max(b.min.x), a.min.y.max(b.min.y));
    let max = Point2::new(a.max.x.min(b.max.x), a.max.y.min(b.max.y));
    (min.x < max.x && min.y < max.y).then_some(Aabb { min, max })
}

fn strip(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Option<Polygon> {
    (min_x < max_x && min_y < max_y).then(|| Polygon::rectangle(min_x, min_y, max_x, max_y))
}

impl GeometryKernel for AxisAlignedKernel {
    #[allow(clippy::float_cmp)]
    fn difference_parts(&self, a: &Polygon, b: &Polygon) -> Result<Vec<Polygon>, GeometryError> {
        let ra = as_rect(a, "minuend")?;
        let rb = as_rect(b, "subtrahend")?;
        let Some(cut) = interior_intersection(&ra, &rb) else {
            return Ok(vec![a.clone()]);
        };

        let full_height = cut.min.y == ra.min.y && cut.max.y == ra.max.y;
        let full_width = cut.min.x == ra.min.x && cut.max.x == ra.max.x;
        let parts: Vec<Polygon> = if full_height {
            [
                strip(ra.min.x, ra.min.y, cut.min.x, ra.max.y),
                strip(cut.max.x, ra.min.y, ra.max.x, ra.max.y),
            ]
            .into_iter()
            .flatten()
            .collect()
        } else if full_width {
            [
                strip(ra.min.x, ra.min.y, ra.max.x, cut.min.y),
                strip(ra.min.x, cut.max.y, ra.max.x, ra.max.y),
            ]
            .into_iter()
            .flatten()
            .collect()
        } else if cut.min.x > ra.min.x
            && cut.max.x < ra.max.x
            && cut.min.y > ra.min.y
            && cut.max.y < ra.max.y
        {
            return Err(GeometryError::Unrepresentable(
                "difference leaves a hole in the polygon".into(),
            ));
        } else {
            return Err(GeometryError::Unsupported(
                "difference is not a union of strips".into(),
            ));
        };
        Ok(parts)
    }

    fn overlaps(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError> {
        let ra = as_rect(a, "first polygon")?;
        let rb = as_rect(b, "second polygon")?;
        Ok(interior_intersection(&ra, &rb).is_some())
    }

    fn disjoint(&self, a: &Polygon, b: &Polygon) -> Result<bool, GeometryError> {
        let ra = as_rect(a, "first polygon")?;
        let rb = as_rect(b, "second polygon")?;
        Ok(!super::boxes_touch(&ra, &rb, 0.0))
    }
}
