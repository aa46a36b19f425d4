use crate::math::polygon_2d::{normalize_ring, rotate_to_canonical_start, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

/// An axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The box as a counter-clockwise polygon.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_points(vec![
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ])
    }
}

/// A simple polygon stored as an open ring (the closing edge is implicit).
///
/// Construction normalizes the ring but does not reject degenerate input;
/// kernel operations report degeneracy when they are asked to use it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Point2>,
}

impl Polygon {
    /// Creates a polygon from ring points, closed or open.
    #[must_use]
    pub fn from_points(points: Vec<Point2>) -> Self {
        Self {
            ring: normalize_ring(&points),
        }
    }

    /// Creates a polygon from `(x, y)` pairs.
    #[must_use]
    pub fn from_xy(coords: &[(f64, f64)]) -> Self {
        Self::from_points(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Axis-aligned rectangle spanning two corners.
    #[must_use]
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Aabb::from_corners(Point2::new(min_x, min_y), Point2::new(max_x, max_y)).to_polygon()
    }

    /// The ring vertices, without the closing point.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.ring
    }

    /// Number of distinct ring vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.ring.len()
    }

    /// Unsigned enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.ring).abs()
    }

    /// Returns `true` when the ring cannot bound any area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.ring.len() < 3 || self.area() < TOLERANCE * TOLERANCE
    }

    /// Computes the bounding box, or `None` for an empty ring.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = self.ring.first()?;
        let mut aabb = Aabb {
            min: *first,
            max: *first,
        };
        for pt in &self.ring[1..] {
            aabb.min.x = aabb.min.x.min(pt.x);
            aabb.min.y = aabb.min.y.min(pt.y);
            aabb.max.x = aabb.max.x.max(pt.x);
            aabb.max.y = aabb.max.y.max(pt.y);
        }
        Some(aabb)
    }

    /// Compares two rings vertex by vertex within `tolerance`, ignoring the
    /// start vertex and winding direction.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.ring.len() != other.ring.len() {
            return false;
        }
        let a = rotate_to_canonical_start(&self.ring);
        let b = rotate_to_canonical_start(&other.ring);
        let close = |p: &Point2, q: &Point2| {
            (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance
        };
        if a.iter().zip(&b).all(|(p, q)| close(p, q)) {
            return true;
        }
        // Same ring walked the other way round.
        let mut reversed = b.clone();
        reversed[1..].reverse();
        a.iter().zip(&reversed).all(|(p, q)| close(p, q))
    }

    /// Converts to a `geo` polygon (closing the ring).
    #[must_use]
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<geo::Coord<f64>> = self
            .ring
            .iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect();
        geo::Polygon::new(geo::LineString::new(coords), vec![])
    }

    /// Builds a polygon from the exterior ring of a `geo` polygon.
    #[must_use]
    pub fn from_geo(polygon: &geo::Polygon<f64>) -> Self {
        Self::from_points(
            polygon
                .exterior()
                .coords()
                .map(|c| Point2::new(c.x, c.y))
                .collect(),
        )
    }
}
