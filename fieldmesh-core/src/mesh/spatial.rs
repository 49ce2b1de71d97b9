//! Uniform grid over mesh triangles, for point location.

use std::collections::HashMap;

use crate::{
    geometry::polygon::{point_in_triangle, triangle_intersects_box},
    mesh::Mesh,
    r2::R2,
};

/// Binary exponent `e` of `x`, with `x = m * 2^e` and `0.5 <= m < 1`.
pub fn frexp_exponent(x: f64) -> i32 {
    ((x.to_bits() >> 52) & 0x7ff) as i32 - 1022
}

/// log2 of the grid cell size: two below the exponent of the target edge
/// length, or of the mean triangle size if the mesh was not refined.
pub fn cell_exponent(target_edge_length: f64, mesh: &Mesh) -> i32 {
    let size = if target_edge_length > 0. && target_edge_length.is_normal() {
        target_edge_length
    } else if mesh.triangles.is_empty() {
        return 0;
    } else {
        (mesh.area() / mesh.triangles.len() as f64).sqrt()
    };
    if size.is_normal() { frexp_exponent(size) - 2 } else { 0 }
}

type Cell = (i64, i64);

#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell: f64,
    cells: HashMap<Cell, Vec<usize>>,
}

impl SpatialIndex {
    /// Register each triangle in every cell it actually touches.
    pub fn new(corners: impl Iterator<Item = [R2<f64>; 3]>, exponent: i32) -> Self {
        let mut index = SpatialIndex { cell: 2f64.powi(exponent), cells: HashMap::new() };
        for (t, tri) in corners.enumerate() {
            let (x0, y0) = index.cell_of(
                tri.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
                tri.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
            );
            let (x1, y1) = index.cell_of(
                tri.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
                tri.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
            );
            for i in x0..=x1 {
                for j in y0..=y1 {
                    let (xmin, xmax, ymin, ymax) = index.cell_box((i, j));
                    if triangle_intersects_box(&tri, xmin, xmax, ymin, ymax) {
                        index.cells.entry((i, j)).or_default().push(t);
                    }
                }
            }
        }
        index
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    pub fn cell_of(&self, x: f64, y: f64) -> Cell {
        ((x / self.cell).floor() as i64, (y / self.cell).floor() as i64)
    }

    /// (xmin, xmax, ymin, ymax) of a cell.
    pub fn cell_box(&self, (i, j): Cell) -> (f64, f64, f64, f64) {
        (i as f64 * self.cell, (i + 1) as f64 * self.cell, j as f64 * self.cell, (j + 1) as f64 * self.cell)
    }

    /// Triangles registered in the cell containing (x, y).
    pub fn candidates(&self, x: f64, y: f64) -> &[usize] {
        self.cells.get(&self.cell_of(x, y)).map_or(&[], Vec::as_slice)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Cell, &Vec<usize>)> {
        self.cells.iter()
    }
}

impl Mesh {
    /// Spatial index, built on first use.
    pub fn spatial_index(&self) -> &SpatialIndex {
        self.spatial
            .get_or_init(|| SpatialIndex::new((0..self.triangles.len()).map(|t| self.corners(t)), self.cell_exponent))
    }

    /// Triangle containing (x, y), counting its boundary.
    pub fn find_triangle(&self, x: f64, y: f64) -> Option<usize> {
        if !self.is_valid() || self.triangles.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let p = R2::new(x, y);
        self.spatial_index().candidates(x, y).iter().cloned().find(|&t| {
            let [a, b, c] = self.corners(t);
            point_in_triangle(&p, &a, &b, &c).is_contained()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn exponents() {
        assert_eq!(frexp_exponent(1.), 1);
        assert_eq!(frexp_exponent(0.5), 0);
        assert_eq!(frexp_exponent(0.1), -3);
        assert_eq!(frexp_exponent(3.), 2);
    }

    #[test]
    fn registration() {
        let tri = [R2::new(0., 0.), R2::new(1., 0.), R2::new(0., 1.)];
        let index = SpatialIndex::new(std::iter::once(tri), -2);
        assert_eq!(index.cell_size(), 0.25);
        // Cells strictly beyond the hypotenuse stay empty.
        assert_eq!(index.candidates(0.9, 0.9), &[] as &[usize]);
        assert_eq!(index.candidates(0.1, 0.1), &[0]);
        assert_eq!(index.candidates(0.6, 0.3), &[0]);
        assert_eq!(index.candidates(-0.1, 0.1), &[] as &[usize]);
        for (&cell, _) in index.cells() {
            let (xmin, xmax, ymin, ymax) = index.cell_box(cell);
            assert!(triangle_intersects_box(&tri, xmin, xmax, ymin, ymax));
        }
    }
}
