use std::collections::HashSet;

use super::*;
use crate::geometry::polygon::distance_to_segment;

mod dielectric;
mod failures;
mod square;

/// Invariants of every valid mesh of `shape`.
fn check_mesh(mesh: &Mesh, shape: &Shape) {
    assert!(mesh.is_valid(), "{:?}", mesh.error());
    assert!(mesh.num_triangles() > 0);
    for t in 0..mesh.num_triangles() {
        assert!(mesh.triangle_area(t) > 0., "triangle {} is degenerate or clockwise", t);
    }
    assert_relative_eq!(mesh.area(), shape.total_area().v(), max_relative = 1e-9);

    let directed: HashSet<(usize, usize)> = mesh
        .triangles()
        .iter()
        .flat_map(|tri| (0..3).map(move |j| (tri.index[j], tri.index[(j + 1) % 3])))
        .collect();
    for (t, tri) in mesh.triangles().iter().enumerate() {
        for j in 0..3 {
            let (a, b) = (tri.index[j], tri.index[(j + 1) % 3]);
            match tri.neighbor[j] {
                Some(nb) => {
                    let other = mesh.triangles()[nb];
                    let k = (0..3)
                        .find(|&k| other.index[k] == b && other.index[(k + 1) % 3] == a)
                        .unwrap_or_else(|| panic!("triangle {} does not share edge ({}, {}) with {}", nb, a, b, t));
                    assert_eq!(other.neighbor[k], Some(t));
                }
                None => assert!(!directed.contains(&(b, a)), "edge ({}, {}) is shared but has no neighbor", a, b),
            }
        }
    }

    for (i, point) in mesh.points().iter().enumerate() {
        let Some(origin) = point.origin else { continue };
        let (a, b) = interpret::edge_ends(shape, origin).unwrap();
        let (dist, _) = distance_to_segment(&point.v(), &a.v(), &b.v());
        assert!(dist <= 1e-9, "point {} is {} away from its edge {:?}", i, dist, origin);
    }
}

fn centroid(mesh: &Mesh, t: usize) -> R2<f64> {
    let [a, b, c] = mesh.corners(t);
    (a + b + c) / 3.
}
