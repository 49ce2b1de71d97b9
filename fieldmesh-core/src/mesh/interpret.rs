//! Mapping triangulator output back onto the shape it came from.

use crate::{
    geometry::{
        edge::EdgeInfo,
        polygon::distance_to_segment,
        shape::Shape,
        vertex::{Origin, Vertex},
    },
    kernel::KernelOutput,
    mesh::{assemble::PointIndex, Triangle},
    r2::R2,
};

/// Endpoints of edge `origin.edge` of piece `origin.piece`.
pub fn edge_ends(shape: &Shape, origin: Origin) -> Option<(&Vertex, &Vertex)> {
    let points = shape.pieces.get(origin.piece)?.points.as_slice();
    let n = points.len();
    if origin.edge >= n {
        return None;
    }
    Some((&points[origin.edge], &points[(origin.edge + 1) % n]))
}

/// Fraction of the way from `a` to `b` that `p` lies at.
pub fn alpha(p: &R2<f64>, a: &R2<f64>, b: &R2<f64>) -> f64 {
    ((*p - *a).norm2() / (*b - *a).norm2()).sqrt()
}

/// Mesh point for kernel point `p` with marker `marker`.
///
/// Panics on marker 1, which the kernel never gives out.
fn point(shape: &Shape, index: &PointIndex, i: usize, p: [f64; 2], marker: i32) -> Vertex {
    match marker {
        1 => panic!("kernel point {} has reserved marker 1", i),
        0 => Vertex::new(p[0], p[1]),
        m if m >= 2 => {
            let origin = index.first((m - 2) as usize);
            let mut v = shape.piece(origin.piece)[origin.edge];
            v.origin = Some(origin);
            v
        }
        m => {
            let upi = (-1 - m) as usize;
            let q = R2::from(p);
            // A point can start edges of several pieces; the one the new point is on wins.
            let origin = index
                .occurrences(upi)
                .iter()
                .cloned()
                .min_by(|o1, o2| {
                    let d = |o: &Origin| {
                        edge_ends(shape, *o).map_or(f64::INFINITY, |(a, b)| distance_to_segment(&q, &a.v(), &b.v()).0)
                    };
                    d(o1).total_cmp(&d(o2))
                })
                .unwrap_or_else(|| panic!("kernel point {} refers to unknown point {}", i, upi));
            let (a, b) = edge_ends(shape, origin).unwrap_or_else(|| panic!("no edge for {:?}", origin));
            let shared = a.e.shared_kind(&b.e);
            let mut v = Vertex::new(p[0], p[1]);
            if !shared.kind.is_default() {
                let t = alpha(&q, &a.v(), &b.v());
                v.e = EdgeInfo::new(shared.kind, t * (shared.dist2 - shared.dist1) + shared.dist1);
            }
            v.origin = Some(origin);
            v
        }
    }
}

/// Mesh points and triangles from kernel output.
///
/// Panics if the output breaks the contract the input set up: triangles
/// that are not triangles, missing or non-integral region attributes, or
/// attributes naming no piece.
pub fn interpret(out: &KernelOutput, shape: &Shape, index: &PointIndex) -> (Vec<Vertex>, Vec<Triangle>) {
    assert_eq!(out.corners_per_triangle, 3, "kernel returned {} corners per triangle", out.corners_per_triangle);
    assert_eq!(
        out.attributes_per_triangle, 1,
        "kernel returned {} attributes per triangle",
        out.attributes_per_triangle
    );
    let n = out.num_triangles();
    assert_eq!(out.triangle_attributes.len(), n, "kernel returned {} attributes for {} triangles", out.triangle_attributes.len(), n);
    assert_eq!(out.neighbors.len(), 3 * n, "kernel returned {} neighbors for {} triangles", out.neighbors.len(), n);

    let points = out
        .points
        .iter()
        .zip(&out.point_markers)
        .enumerate()
        .map(|(i, (p, &marker))| point(shape, index, i, *p, marker))
        .collect();

    let triangles = (0..n)
        .map(|t| {
            let attribute = out.triangle_attributes[t];
            let material = attribute.round();
            assert!(
                material == attribute && material >= 0. && (material as usize) < shape.num_pieces(),
                "triangle {} has region attribute {}",
                t,
                attribute
            );
            let index = [0, 1, 2].map(|j| out.triangles[3 * t + j]);
            // Kernel neighbor i is across from corner i, i.e. the edge from corner i+1 to i+2.
            let neighbor = [0, 1, 2].map(|j| {
                let nb = out.neighbors[3 * t + (j + 2) % 3];
                if nb < 0 { None } else { Some(nb as usize) }
            });
            Triangle { index, material: material as usize, neighbor }
        })
        .collect();
    (points, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::edge::EdgeKind;
    use test_log::test;

    fn square_output(markers: Vec<i32>, attribute: f64) -> KernelOutput {
        KernelOutput {
            points: vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.], [0.25, 0.]],
            point_markers: markers,
            corners_per_triangle: 3,
            attributes_per_triangle: 1,
            triangles: vec![0, 4, 3, 4, 1, 2, 4, 2, 3],
            triangle_attributes: vec![attribute; 3],
            neighbors: vec![2, -1, -1, -1, 2, -1, -1, 0, 1],
        }
    }

    fn port_square() -> Shape {
        let mut shape = Shape::rectangle(0., 0., 1., 1.);
        shape.assign_port(0, 0, EdgeKind::Port(1)).unwrap();
        shape
    }

    #[test]
    fn points_and_neighbors() {
        let shape = port_square();
        let index = PointIndex::new(&shape);
        let (points, triangles) = interpret(&square_output(vec![2, 3, 4, 5, -1], 0.), &shape, &index);
        assert_eq!(points.len(), 5);
        assert_eq!(points[1].origin, Some(Origin { piece: 0, edge: 1 }));
        assert_eq!(points[1].e, shape.piece(0)[1].e);
        let split = points[4];
        assert_eq!(split.origin, Some(Origin { piece: 0, edge: 0 }));
        assert_eq!(split.e.kind[0], EdgeKind::Port(1));
        assert_relative_eq!(split.e.dist[0], 0.25);
        // Only edge 4 -> 3 of the first triangle is shared.
        assert_eq!(triangles[0].neighbor, [None, Some(2), None]);
        assert_eq!(triangles[2].neighbor, [Some(1), None, Some(0)]);
    }

    #[test]
    fn interior_point() {
        let shape = Shape::rectangle(0., 0., 1., 1.);
        let index = PointIndex::new(&shape);
        let (points, _) = interpret(&square_output(vec![2, 3, 4, 5, 0], 0.), &shape, &index);
        assert_eq!(points[4].origin, None);
        assert!(points[4].e.is_default());
    }

    #[test]
    #[should_panic(expected = "reserved marker 1")]
    fn reserved_marker() {
        let shape = Shape::rectangle(0., 0., 1., 1.);
        let index = PointIndex::new(&shape);
        interpret(&square_output(vec![2, 3, 4, 5, 1], 0.), &shape, &index);
    }

    #[test]
    #[should_panic(expected = "region attribute")]
    fn fractional_attribute() {
        let shape = Shape::rectangle(0., 0., 1., 1.);
        let index = PointIndex::new(&shape);
        interpret(&square_output(vec![2, 3, 4, 5, 0], 0.5), &shape, &index);
    }

    #[test]
    #[should_panic(expected = "region attribute")]
    fn attribute_out_of_range() {
        let shape = Shape::rectangle(0., 0., 1., 1.);
        let index = PointIndex::new(&shape);
        interpret(&square_output(vec![2, 3, 4, 5, 0], 1.), &shape, &index);
    }
}
