use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Drops the closing point of a ring and any consecutive duplicates.
#[must_use]
pub fn normalize_ring(points: &[Point2]) -> Vec<Point2> {
    let mut ring: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        if ring.last().is_none_or(|last| !same_point(last, &pt)) {
            ring.push(pt);
        }
    }
    while ring.len() > 1 && same_point(&ring[0], &ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

/// Returns `true` if both coordinates agree within [`TOLERANCE`].
#[must_use]
pub fn same_point(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}

/// Rotates a ring so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic comparisons.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Returns `true` if segments `a0→a1` and `b0→b1` are collinear within
/// `tolerance` and overlap along a stretch longer than `tolerance`.
///
/// The longer segment supplies the reference line. Touching at a single
/// point does not count.
#[must_use]
pub fn collinear_overlap(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, tolerance: f64) -> bool {
    let (len_a, len_b) = ((a1 - a0).norm(), (b1 - b0).norm());
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return false;
    }
    let (base0, base1, other0, other1, len) = if len_a >= len_b {
        (a0, a1, b0, b1, len_a)
    } else {
        (b0, b1, a0, a1, len_b)
    };
    let dir: Vector2 = (base1 - base0) / len;

    // Distance of both endpoints of the shorter segment from the base line.
    let off0 = dir.perp(&(other0 - base0)).abs();
    let off1 = dir.perp(&(other1 - base0)).abs();
    if off0 > tolerance || off1 > tolerance {
        return false;
    }

    // Project onto the base line and intersect the parameter intervals.
    let t0 = dir.dot(&(other0 - base0));
    let t1 = dir.dot(&(other1 - base0));
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(len);
    hi - lo > tolerance
}

/// Returns the distance from `p` to the segment `s0→s1`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, s0: &Point2, s1: &Point2) -> f64 {
    let d: Vector2 = s1 - s0;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (p - s0).norm();
    }
    let t = ((p - s0).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (s0 + d * t)).norm()
}

/// Smallest distance between the boundaries of two rings that do not cross.
///
/// For non-crossing rings the closest pair always involves a vertex, so the
/// vertex-to-edge distances in both directions suffice.
#[must_use]
pub fn ring_gap(a: &[Point2], b: &[Point2]) -> f64 {
    vertex_gap(a, b).min(vertex_gap(b, a))
}

fn vertex_gap(from: &[Point2], to: &[Point2]) -> f64 {
    let mut best = f64::INFINITY;
    for p in from {
        for (s0, s1) in ring_edges(to) {
            best = best.min(point_to_segment_dist(p, s0, s1));
        }
    }
    best
}

/// Iterates the edges of a closed ring as point pairs.
pub fn ring_edges(points: &[Point2]) -> impl Iterator<Item = (&Point2, &Point2)> {
    let n = points.len();
    (0..n).map(move |i| (&points[i], &points[(i + 1) % n]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::SNAP_RATIO;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn signed_area_ccw_square() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let area = signed_area_2d(&pts);
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let pts = vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        let area = signed_area_2d(&pts);
        assert!((area + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[p(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn normalize_drops_closing_and_duplicates() {
        let ring = normalize_ring(&[
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(0.0, 0.0),
        ]);
        assert_eq!(ring.len(), 3);
        assert!(same_point(&ring[2], &p(2.0, 1.0)));
    }

    #[test]
    fn canonical_start_rotation() {
        let pts = vec![p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0)];
        let rotated = rotate_to_canonical_start(&pts);
        assert!((rotated[0].x).abs() < TOLERANCE);
        assert!((rotated[0].y).abs() < TOLERANCE);
        assert!((rotated[1].x - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_overlap_shared_edge() {
        // Opposite directions, overlapping on [0.5, 1].
        assert!(collinear_overlap(
            &p(0.0, 1.0),
            &p(1.0, 1.0),
            &p(1.5, 1.0),
            &p(0.5, 1.0),
            TOLERANCE
        ));
    }

    #[test]
    fn collinear_overlap_point_contact_only() {
        assert!(!collinear_overlap(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(1.0, 0.0),
            &p(2.0, 0.0),
            TOLERANCE
        ));
    }

    #[test]
    fn collinear_overlap_parallel_offset() {
        assert!(!collinear_overlap(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(0.0, 0.5),
            &p(1.0, 0.5),
            TOLERANCE
        ));
    }

    #[test]
    fn collinear_overlap_tolerates_clipper_noise() {
        // A short edge a few 1e-9 off a long one, as boolean ops produce them.
        assert!(collinear_overlap(
            &p(2.5, 0.75 + 4e-9),
            &p(2.2, 1.2),
            &p(3.0, 0.0),
            &p(1.0, 3.0),
            3.0 * SNAP_RATIO
        ));
        assert!(!collinear_overlap(
            &p(2.5, 0.75 + 4e-9),
            &p(2.2, 1.2),
            &p(3.0, 0.0),
            &p(1.0, 3.0),
            TOLERANCE
        ));
    }

    #[test]
    fn point_to_segment_clamps_to_endpoints() {
        let d = point_to_segment_dist(&p(3.0, 4.0), &p(-1.0, 0.0), &p(0.0, 0.0));
        assert!((d - 5.0).abs() < TOLERANCE);
        let d = point_to_segment_dist(&p(0.5, 2.0), &p(0.0, 0.0), &p(1.0, 0.0));
        assert!((d - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn ring_gap_between_separate_squares() {
        let a = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let b = vec![p(1.5, 0.5), p(2.5, 0.5), p(2.5, 1.5), p(1.5, 1.5)];
        assert!((ring_gap(&a, &b) - 0.5).abs() < TOLERANCE);
        assert!((ring_gap(&b, &a) - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn ring_edges_wraps_around() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let edges: Vec<_> = ring_edges(&pts).collect();
        assert_eq!(edges.len(), 3);
        assert!(same_point(edges[2].1, &pts[0]));
    }
}
