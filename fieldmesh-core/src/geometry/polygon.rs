//! Free functions on polygon rings and triangles.

use itertools::Itertools;

use crate::{dual::Dual, geometry::vertex::Vertex, r2::R2};

/// Result of a point-in-region test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    Outside,
    Inside,
    Boundary,
}

impl Containment {
    /// Boundary points count as contained.
    pub fn is_contained(&self) -> bool {
        *self != Containment::Outside
    }
}

/// Twice the signed area of triangle abc, positive if counterclockwise.
pub fn orient(a: &R2<f64>, b: &R2<f64>, c: &R2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Shoelace area, positive for counterclockwise rings.
pub fn signed_area(points: &[Vertex]) -> Dual {
    if points.len() < 3 {
        return Dual::constant(0.);
    }
    let twice: Dual = points
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.p.x * b.p.y - b.p.x * a.p.y)
        .sum();
    twice / 2.
}

/// Where `p` is relative to triangle abc (either orientation).
pub fn point_in_triangle(p: &R2<f64>, a: &R2<f64>, b: &R2<f64>, c: &R2<f64>) -> Containment {
    let sign = if orient(a, b, c) < 0. { -1. } else { 1. };
    let d = [
        sign * orient(a, b, p),
        sign * orient(b, c, p),
        sign * orient(c, a, p),
    ];
    if d.iter().any(|d| *d < 0.) {
        Containment::Outside
    } else if d.iter().any(|d| *d == 0.) {
        Containment::Boundary
    } else {
        Containment::Inside
    }
}

/// Whether the closed triangle and the closed box share any point.
pub fn triangle_intersects_box(tri: &[R2<f64>; 3], xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> bool {
    let (tx0, tx1) = tri.iter().map(|p| p.x).minmax().into_option().unwrap_or((0., 0.));
    let (ty0, ty1) = tri.iter().map(|p| p.y).minmax().into_option().unwrap_or((0., 0.));
    if tx1 < xmin || tx0 > xmax || ty1 < ymin || ty0 > ymax {
        return false;
    }
    let corners = [
        R2::new(xmin, ymin),
        R2::new(xmax, ymin),
        R2::new(xmax, ymax),
        R2::new(xmin, ymax),
    ];
    // Separating axes left to try are the three edge normals.
    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];
        let c = tri[(i + 2) % 3];
        let n = R2::new(a.y - b.y, b.x - a.x);
        let on_edge = n.dot(&a);
        let (t0, t1) = if n.dot(&c) < on_edge { (n.dot(&c), on_edge) } else { (on_edge, n.dot(&c)) };
        let (b0, b1) = corners.iter().map(|q| n.dot(q)).minmax().into_option().unwrap_or((0., 0.));
        if t1 < b0 || b1 < t0 {
            return false;
        }
    }
    true
}

/// Whether segments a0-a1 and b0-b1 cross at a single point interior to both.
pub fn segments_cross(a0: &R2<f64>, a1: &R2<f64>, b0: &R2<f64>, b1: &R2<f64>) -> bool {
    let d1 = orient(a0, a1, b0);
    let d2 = orient(a0, a1, b1);
    let d3 = orient(b0, b1, a0);
    let d4 = orient(b0, b1, a1);
    d1 * d2 < 0. && d3 * d4 < 0.
}

/// Distance from `p` to segment ab, and the parameter of the closest point.
pub fn distance_to_segment(p: &R2<f64>, a: &R2<f64>, b: &R2<f64>) -> (f64, f64) {
    let ab = *b - *a;
    let len2 = ab.norm2();
    let t = if len2 == 0. { 0. } else { ((*p - *a).dot(&ab) / len2).clamp(0., 1.) };
    let q = *a + ab * t;
    ((*p - q).norm(), t)
}

/// Winding number of a closed ring around `p`.
pub fn winding_number(ring: &[R2<f64>], p: &R2<f64>) -> i32 {
    let mut w = 0;
    for (a, b) in ring.iter().circular_tuple_windows() {
        if a.y <= p.y {
            if b.y > p.y && orient(a, b, p) > 0. {
                w += 1;
            }
        } else if b.y <= p.y && orient(a, b, p) < 0. {
            w -= 1;
        }
    }
    w
}

/// A point strictly inside the polygon formed by the first `poly_size`
/// points of `poly` (all of them if `None`), in either orientation.
///
/// Points after `poly_size` belong to holes of the polygon and are only
/// used to keep the answer out of them, so holes need no special handling.
/// Returns `None` for a polygon with no interior.
pub fn any_point_in_poly(poly: &[Vertex], poly_size: Option<usize>) -> Option<R2<f64>> {
    let n = poly_size.unwrap_or(poly.len());
    if n < 3 || n > poly.len() {
        return None;
    }
    let pts: Vec<R2<f64>> = poly.iter().map(Vertex::v).collect();
    // The leftmost (then lowest) vertex is always convex.
    let iv = (0..n).min_by(|&i, &j| {
        pts[i].x.total_cmp(&pts[j].x).then(pts[i].y.total_cmp(&pts[j].y))
    })?;
    let v = pts[iv];
    let a = pts[(iv + n - 1) % n];
    let b = pts[(iv + 1) % n];
    if orient(&a, &v, &b) == 0. {
        return None;
    }
    // Of the points inside triangle avb, the one farthest from ab is visible from v.
    let mut best: Option<(f64, R2<f64>)> = None;
    for q in &pts {
        if *q == a || *q == v || *q == b {
            continue;
        }
        if point_in_triangle(q, &a, &v, &b) == Containment::Outside {
            continue;
        }
        if orient(&v, &a, q) == 0. || orient(&v, &b, q) == 0. {
            continue;
        }
        let dist = orient(&a, &b, q).abs();
        if best.map_or(true, |(d, _)| dist > d) {
            best = Some((dist, *q));
        }
    }
    Some(match best {
        None => (a + v + b) / 3.,
        Some((_, q)) => (v + q) / 2.,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn ring(coords: &[(f64, f64)]) -> Vec<Vertex> {
        coords.iter().map(|&(x, y)| Vertex::new(x, y)).collect()
    }

    #[test]
    fn area_signs() {
        let ccw = ring(&[(0., 0.), (2., 0.), (2., 1.), (0., 1.)]);
        assert_eq!(signed_area(&ccw).v(), 2.);
        let cw: Vec<Vertex> = ccw.iter().rev().cloned().collect();
        assert_eq!(signed_area(&cw).v(), -2.);
    }

    #[test]
    fn triangle_containment() {
        let a = R2::new(0., 0.);
        let b = R2::new(1., 0.);
        let c = R2::new(0., 1.);
        assert_eq!(point_in_triangle(&R2::new(0.2, 0.2), &a, &b, &c), Containment::Inside);
        assert_eq!(point_in_triangle(&R2::new(0.2, 0.2), &a, &c, &b), Containment::Inside);
        assert_eq!(point_in_triangle(&R2::new(0.5, 0.), &a, &b, &c), Containment::Boundary);
        assert_eq!(point_in_triangle(&b, &a, &b, &c), Containment::Boundary);
        assert_eq!(point_in_triangle(&R2::new(0.6, 0.6), &a, &b, &c), Containment::Outside);
        assert!(Containment::Boundary.is_contained());
    }

    #[test]
    fn box_intersection() {
        let tri = [R2::new(0., 0.), R2::new(1., 0.), R2::new(0., 1.)];
        assert!(triangle_intersects_box(&tri, 0.1, 0.2, 0.1, 0.2));
        // Box contains the whole triangle.
        assert!(triangle_intersects_box(&tri, -1., 2., -1., 2.));
        // Inside the bounding box but beyond the hypotenuse.
        assert!(!triangle_intersects_box(&tri, 0.7, 0.9, 0.7, 0.9));
        // Touching the hypotenuse at a corner.
        assert!(triangle_intersects_box(&tri, 0.5, 0.9, 0.5, 0.9));
        assert!(!triangle_intersects_box(&tri, 1.1, 1.2, 0., 0.1));
    }

    #[test]
    fn crossing() {
        let o = R2::new(0., 0.);
        let x = R2::new(1., 1.);
        assert!(segments_cross(&o, &x, &R2::new(0., 1.), &R2::new(1., 0.)));
        // Shared endpoints and T junctions are not crossings.
        assert!(!segments_cross(&o, &x, &x, &R2::new(2., 0.)));
        assert!(!segments_cross(&o, &R2::new(2., 0.), &R2::new(1., 0.), &R2::new(1., 1.)));
    }

    #[test]
    fn winding() {
        let sq: Vec<R2<f64>> = vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(1., 1.), R2::new(0., 1.)];
        assert_eq!(winding_number(&sq, &R2::new(0.5, 0.5)), 1);
        assert_eq!(winding_number(&sq, &R2::new(1.5, 0.5)), 0);
        let rev: Vec<R2<f64>> = sq.iter().rev().cloned().collect();
        assert_eq!(winding_number(&rev, &R2::new(0.5, 0.5)), -1);
    }

    #[test]
    fn point_in_concave() {
        // A "C" shape whose leftmost corner triangle contains a reflex vertex.
        let c = ring(&[(0., 0.), (3., 0.), (3., 1.), (1., 1.), (1., 2.), (3., 2.), (3., 3.), (0., 3.)]);
        let p = any_point_in_poly(&c, None).unwrap();
        let rc: Vec<R2<f64>> = c.iter().map(Vertex::v).collect();
        assert_eq!(winding_number(&rc, &p), 1);
        let reversed: Vec<Vertex> = c.iter().rev().cloned().collect();
        let p = any_point_in_poly(&reversed, None).unwrap();
        assert_ne!(winding_number(&rc, &p), 0);
    }

    #[test]
    fn point_avoids_holes() {
        let mut poly = ring(&[(0., 0.), (4., 0.), (4., 4.), (0., 4.)]);
        let hole = ring(&[(0.5, 0.5), (0.5, 3.5), (3.5, 3.5), (3.5, 0.5)]);
        let hole_ring: Vec<R2<f64>> = hole.iter().map(Vertex::v).collect();
        poly.extend(hole);
        let p = any_point_in_poly(&poly, Some(4)).unwrap();
        assert_eq!(winding_number(&hole_ring, &p), 0);
        assert!(p.x > 0. && p.x < 4. && p.y > 0. && p.y < 4.);
    }

    #[test]
    fn degenerate() {
        assert_eq!(any_point_in_poly(&ring(&[(0., 0.), (1., 0.)]), None), None);
        assert_eq!(any_point_in_poly(&ring(&[(0., 0.), (1., 0.), (2., 0.)]), None), None);
    }
}
