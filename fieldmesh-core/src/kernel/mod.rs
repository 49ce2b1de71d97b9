//! Constrained Delaunay triangulation behind a Triangle-style interface:
//! flat point, segment, region and hole tables in; triangle, attribute and
//! neighbor tables out.

pub mod oracle;
mod predicates;
mod refine;
mod triangulation;

use std::fmt::{self, Display, Formatter};

use crate::error::KernelError;

pub use refine::DelaunayRefiner;

/// Per-triangle refinement test: the three corners and the area. Returns
/// true if the triangle must be split. Carries no user data.
pub type UnsuitableFn = fn(&[f64; 2], &[f64; 2], &[f64; 2], f64) -> bool;

/// Region seed: a point, the attribute given to every triangle reachable
/// from it without crossing a segment, and an (unused) area bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionSeed {
    pub x: f64,
    pub y: f64,
    pub attribute: f64,
    pub max_area: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelInput {
    pub points: Vec<[f64; 2]>,
    pub point_markers: Vec<i32>,
    pub segments: Vec<[usize; 2]>,
    pub segment_markers: Vec<i32>,
    pub regions: Vec<RegionSeed>,
    pub holes: Vec<[f64; 2]>,
}

/// Output points start with the input points, in order. Points added by the
/// kernel take the marker of the segment they split, or 0 in the interior.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelOutput {
    pub points: Vec<[f64; 2]>,
    pub point_markers: Vec<i32>,
    pub corners_per_triangle: usize,
    pub attributes_per_triangle: usize,
    /// `corners_per_triangle` point indices per triangle, counterclockwise.
    pub triangles: Vec<usize>,
    pub triangle_attributes: Vec<f64>,
    /// Three per triangle; entry `i` is across from corner `i`, -1 for none.
    pub neighbors: Vec<i64>,
}

impl KernelOutput {
    pub fn num_triangles(&self) -> usize {
        if self.corners_per_triangle == 0 { 0 } else { self.triangles.len() / self.corners_per_triangle }
    }
}

/// Kernel options, named after Triangle's command line switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switches {
    /// `z`: indices start at 0.
    pub zero_based: bool,
    /// `p`: triangulate a planar straight line graph (honor segments, regions and holes).
    pub pslg: bool,
    /// `A`: one attribute per triangle from the region seeds.
    pub region_attributes: bool,
    /// `Q`: no progress output.
    pub quiet: bool,
    /// `q` and `u`: refine with quality and the user oracle.
    pub refine: bool,
    /// `n`: output neighbor table.
    pub neighbors: bool,
}

impl Switches {
    /// Switches for meshing a shape, with or without size refinement.
    pub fn for_mesh(refine: bool) -> Self {
        Switches {
            zero_based: true,
            pslg: true,
            region_attributes: true,
            quiet: true,
            refine,
            neighbors: true,
        }
    }
}

impl Display for Switches {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.zero_based, "z"),
            (self.pslg, "p"),
            (self.region_attributes, "A"),
            (self.quiet, "Q"),
            (self.refine, "qu"),
            (self.neighbors, "n"),
        ];
        for (on, s) in flags {
            if on {
                write!(f, "{}", s)?;
            }
        }
        Ok(())
    }
}

pub trait Triangulator {
    fn triangulate(
        &self,
        switches: &Switches,
        input: &KernelInput,
        unsuitable: Option<UnsuitableFn>,
    ) -> Result<KernelOutput, KernelError>;
}
