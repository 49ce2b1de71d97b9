use super::*;
use crate::{
    geometry::{polygon::point_in_triangle, vertex::Origin},
    math::complex::Complex,
};
use test_log::test;

#[test]
fn unit_square() {
    let shape = Shape::rectangle(0., 0., 1., 1.);
    let mesh = Mesh::new(&shape, 0.1, None);
    check_mesh(&mesh, &shape);
    let n = mesh.num_triangles();
    assert!((50..=1200).contains(&n), "{} triangles", n);
    let (_, longest) = mesh.edge_length_range().unwrap();
    assert!(longest <= 0.1 * (1. + 1e-9), "longest edge {}", longest);
    assert_eq!(mesh.cell_exponent(), -5);

    let t = mesh.find_triangle(0.5, 0.5).unwrap();
    let [a, b, c] = mesh.corners(t);
    assert!(point_in_triangle(&R2::new(0.5, 0.5), &a, &b, &c).is_contained());

    // Corners keep their place in the shape.
    for (k, corner) in shape.piece(0).iter().enumerate() {
        let point = mesh.points()[k];
        assert_eq!(point.v(), corner.v());
        assert_eq!(point.origin, Some(Origin { piece: 0, edge: k }));
    }
    assert!(mesh.points()[4..].iter().any(|p| p.origin.is_none()));
    assert_eq!(mesh.materials(), &[Material::default()]);
    assert!(mesh.dielectric().is_empty());
}

#[test]
fn unrefined() {
    let shape = Shape::rectangle(0., 0., 1., 1.);
    let mesh = Mesh::new(&shape, 0., None);
    check_mesh(&mesh, &shape);
    assert_eq!(mesh.num_points(), 4);
    assert_eq!(mesh.num_triangles(), 2);
    // Mean triangle size sqrt(0.5) has exponent 0.
    assert_eq!(mesh.cell_exponent(), -2);
    assert_eq!(mesh.boundary_edges().count(), 4);
    assert!(mesh.find_triangle(0.25, 0.75).is_some());
}

#[test]
fn idempotent() {
    let mut shape = Shape::circle(0., 0., 1., 24);
    shape.rotate(10.);
    let m1 = Mesh::new(&shape, 0.15, None);
    let m2 = Mesh::new(&shape, 0.15, None);
    check_mesh(&m1, &shape);
    assert_eq!(m1.triangles(), m2.triangles());
    assert_eq!(m1.materials(), m2.materials());
    let bits = |m: &Mesh| -> Vec<(u64, u64)> {
        m.points().iter().map(|p| (p.v().x.to_bits(), p.v().y.to_bits())).collect()
    };
    assert_eq!(bits(&m1), bits(&m2));
}

#[test]
fn two_materials() {
    let mut shape = Shape::rectangle(0., 0., 2., 1.);
    let glass = Material::new(0x8080ff, Complex::re(Dual::constant(4.)));
    shape.paint(&Shape::rectangle(1., 0., 2., 1.), &glass);
    let mesh = Mesh::new(&shape, 0.2, None);
    check_mesh(&mesh, &shape);
    assert_eq!(mesh.materials().len(), shape.num_pieces());
    for t in 0..mesh.num_triangles() {
        let c = centroid(&mesh, t);
        let material = &mesh.materials()[mesh.triangles()[t].material];
        assert_eq!(material == &glass, c.x > 1., "triangle {} at {}", t, c);
    }
    // The material interface is interior: its edges all have neighbors.
    for edge in mesh.boundary_edges() {
        let (p, q) = (mesh.points()[edge.pindex1].v(), mesh.points()[edge.pindex2].v());
        assert!(!(p.x == 1. && q.x == 1.), "interface edge {} - {} on the boundary", p, q);
    }
}
