//! Triangle meshes of shapes.
//!
//! A [`Mesh`] is built once from a [`Shape`]: the shape is checked and laid
//! out for the triangulator, the triangulator runs under the size oracle,
//! and its output is mapped back so every boundary point knows which shape
//! edge it lies on. That link lets [`Mesh::update_derivatives`] refresh
//! point derivatives when the shape's parameters move without remeshing.

pub mod assemble;
pub mod derivatives;
pub mod dielectric;
pub mod interpret;
pub mod spatial;

#[cfg(test)]
mod tests;

use std::{
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, OnceLock, PoisonError},
};

use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use dielectric::{PropertyEvaluator, PropertyValues};
pub use spatial::SpatialIndex;

use crate::{
    config::MeshConfig,
    dual::Dual,
    error::{KernelError, MeshError},
    geometry::{edge::EdgeKind, material::Material, polygon::orient, shape::Shape, vertex::Vertex},
    kernel::{
        oracle::{triangle_unsuitable, OracleScope},
        DelaunayRefiner, KernelInput, KernelOutput, Switches, Triangulator, UnsuitableFn,
    },
    math::complex::Complex,
    r2::R2,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    /// Point indices, counterclockwise.
    pub index: [usize; 3],
    /// Index of the shape piece (and material) this triangle belongs to.
    pub material: usize,
    /// `neighbor[j]` shares the edge from `index[j]` to `index[(j + 1) % 3]`;
    /// `None` makes that edge part of the mesh boundary.
    pub neighbor: [Option<usize>; 3],
}

/// An edge with no triangle on its other side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryEdge {
    pub triangle: usize,
    pub pindex1: usize,
    pub pindex2: usize,
    /// Classification both end points share.
    pub kind: EdgeKind,
    pub dist1: f64,
    pub dist2: f64,
}

#[derive(Clone, Debug)]
pub struct Mesh {
    points: Vec<Vertex>,
    triangles: Vec<Triangle>,
    materials: Vec<Material>,
    dielectric: Vec<Complex<Dual>>,
    cell_exponent: i32,
    spatial: OnceLock<SpatialIndex>,
    error: Option<MeshError>,
}

static REPORTED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// Log a construction failure, once per distinct message.
fn report(err: &MeshError) {
    let message = err.to_string();
    let mut reported = REPORTED.lock().unwrap_or_else(PoisonError::into_inner);
    if reported.insert(message.clone()) {
        error!("{}", message);
    } else {
        debug!("{} (again)", message);
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run the triangulator with the size oracle set to `target_edge_length`.
/// A panicking triangulator is reported as [`KernelError::Aborted`].
fn run_kernel(
    kernel: &dyn Triangulator,
    switches: &Switches,
    input: &KernelInput,
    target_edge_length: f64,
) -> Result<KernelOutput, KernelError> {
    let _scope = OracleScope::enter(target_edge_length);
    let unsuitable: Option<UnsuitableFn> = if switches.refine { Some(triangle_unsuitable) } else { None };
    match panic::catch_unwind(AssertUnwindSafe(|| kernel.triangulate(switches, input, unsuitable))) {
        Ok(result) => result,
        Err(payload) => Err(KernelError::Aborted(panic_message(payload))),
    }
}

impl Mesh {
    /// Mesh `shape` with edges no longer than `target_edge_length` (no
    /// refinement if it is 0 or less). Failures give an invalid mesh; see
    /// [`Mesh::error`].
    pub fn new(shape: &Shape, target_edge_length: f64, evaluator: Option<&mut dyn PropertyEvaluator>) -> Mesh {
        let config = MeshConfig::new(target_edge_length);
        Mesh::with_config(shape, &config, evaluator, &DelaunayRefiner::new(config.max_points))
    }

    pub fn with_config(
        shape: &Shape,
        config: &MeshConfig,
        evaluator: Option<&mut dyn PropertyEvaluator>,
        kernel: &dyn Triangulator,
    ) -> Mesh {
        match Mesh::build(shape, config, evaluator, kernel) {
            Ok(mesh) => mesh,
            Err(err) => {
                report(&err);
                Mesh::invalid(err)
            }
        }
    }

    /// Like [`Mesh::with_config`], but failures are returned instead of logged.
    pub fn build(
        shape: &Shape,
        config: &MeshConfig,
        evaluator: Option<&mut dyn PropertyEvaluator>,
        kernel: &dyn Triangulator,
    ) -> Result<Mesh, MeshError> {
        let (input, index) = assemble::assemble(shape, config)?;
        let switches = Switches::for_mesh(config.refine());
        let output = run_kernel(kernel, &switches, &input, config.target_edge_length)?;
        let (points, triangles) = interpret::interpret(&output, shape, &index);
        let mut mesh = Mesh {
            points,
            triangles,
            materials: shape.pieces.iter().map(|piece| piece.material.clone()).collect(),
            dielectric: vec![],
            cell_exponent: 0,
            spatial: OnceLock::new(),
            error: None,
        };
        mesh.cell_exponent = spatial::cell_exponent(config.target_edge_length, &mesh);
        mesh.update_derivatives(shape)?;
        if let Some(evaluator) = evaluator {
            mesh.evaluate_dielectric(evaluator);
        }
        debug!(
            "meshed {} pieces into {} points, {} triangles",
            shape.num_pieces(),
            mesh.points.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }

    fn invalid(error: MeshError) -> Mesh {
        Mesh {
            points: vec![],
            triangles: vec![],
            materials: vec![],
            dielectric: vec![],
            cell_exponent: 0,
            spatial: OnceLock::new(),
            error: Some(error),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Why the mesh is invalid.
    pub fn error(&self) -> Option<&MeshError> {
        self.error.as_ref()
    }

    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Per-point permittivity from material callbacks; empty if none was computed.
    pub fn dielectric(&self) -> &[Complex<Dual>] {
        &self.dielectric
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// log2 of the spatial index cell size.
    pub fn cell_exponent(&self) -> i32 {
        self.cell_exponent
    }

    pub fn corners(&self, t: usize) -> [R2<f64>; 3] {
        self.triangles[t].index.map(|i| self.points[i].v())
    }

    pub fn triangle_area(&self, t: usize) -> f64 {
        let [a, b, c] = self.corners(t);
        orient(&a, &b, &c) / 2.
    }

    pub fn area(&self) -> f64 {
        (0..self.triangles.len()).map(|t| self.triangle_area(t)).sum()
    }

    /// Shortest and longest triangle edges.
    pub fn edge_length_range(&self) -> Option<(f64, f64)> {
        (0..self.triangles.len())
            .flat_map(|t| {
                let [a, b, c] = self.corners(t);
                [(b - a).norm(), (c - b).norm(), (a - c).norm()]
            })
            .fold(None, |acc, len| match acc {
                None => Some((len, len)),
                Some((lo, hi)) => Some((lo.min(len), hi.max(len))),
            })
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = BoundaryEdge> + '_ {
        self.triangles.iter().enumerate().flat_map(move |(t, tri)| {
            (0..3).filter(move |&j| tri.neighbor[j].is_none()).map(move |j| {
                let (pindex1, pindex2) = (tri.index[j], tri.index[(j + 1) % 3]);
                let shared = self.points[pindex1].e.shared_kind(&self.points[pindex2].e);
                BoundaryEdge {
                    triangle: t,
                    pindex1,
                    pindex2,
                    kind: shared.kind,
                    dist1: shared.dist1,
                    dist2: shared.dist2,
                }
            })
        })
    }
}
