use crate::{
    error::MeshError,
    geometry::{material::Material, shape::Shape},
    mesh::{interpret::{alpha, edge_ends}, Mesh},
    r2::R2,
};

/// Materials that may swap in for each other without remeshing.
fn same_identity(a: &Material, b: &Material) -> bool {
    a.color == b.color && a.callback == b.callback
}

impl Mesh {
    /// Recompute derivatives from `shape`, which must be the shape this mesh
    /// was built from, possibly with different derivatives.
    ///
    /// Each boundary point's derivative interpolates those of the ends of the
    /// shape edge it lies on. Interior points keep theirs. Materials are
    /// copied again. Nothing changes if an error is returned, and an invalid
    /// mesh is left alone.
    pub fn update_derivatives(&mut self, shape: &Shape) -> Result<(), MeshError> {
        if !self.is_valid() {
            return Ok(());
        }
        if shape.num_pieces() != self.materials.len() {
            return Err(MeshError::MaterialCount { shape: shape.num_pieces(), mesh: self.materials.len() });
        }
        if let Some(i) = (0..self.materials.len()).find(|&i| !same_identity(shape.material(i), &self.materials[i])) {
            return Err(MeshError::MaterialChanged(i));
        }
        let mut derivatives: Vec<(usize, R2<f64>)> = vec![];
        for (i, point) in self.points.iter().enumerate() {
            let Some(origin) = point.origin else { continue };
            let (a, b) = edge_ends(shape, origin).ok_or(MeshError::StaleOrigin {
                point: i,
                piece: origin.piece,
                edge: origin.edge,
            })?;
            let t = alpha(&point.v(), &a.v(), &b.v());
            derivatives.push((i, a.p.d() * (1. - t) + b.p.d() * t));
        }
        for (i, d) in derivatives {
            let p = &mut self.points[i].p;
            p.x.set_d(d.x);
            p.y.set_d(d.y);
        }
        self.materials = shape.pieces.iter().map(|piece| piece.material.clone()).collect();
        Ok(())
    }
}
