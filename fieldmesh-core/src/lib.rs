#[cfg_attr(not(test), allow(unused_imports))]
#[macro_use]
extern crate approx;

pub mod config;
pub mod dual;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod mesh;
pub mod r2;

pub use geometry::edge;
pub use geometry::material;
pub use geometry::polygon;
pub use geometry::shape;
pub use geometry::vertex;

pub use config::MeshConfig;
pub use dual::Dual;
pub use edge::{EdgeInfo, EdgeKind};
pub use error::{EvaluatorError, GeometryError, KernelError, MeshError};
pub use kernel::{DelaunayRefiner, Triangulator};
pub use material::Material;
pub use math::complex::Complex;
pub use mesh::{BoundaryEdge, Mesh, PropertyEvaluator, PropertyValues, Triangle};
pub use r2::R2;
pub use shape::{Piece, Shape};
pub use vertex::{Origin, Vertex};

/// Parse a log level string into LevelFilter.
pub fn parse_log_level(level: Option<&str>) -> log::LevelFilter {
    match level {
        Some("off") => log::LevelFilter::Off,
        Some("error") => log::LevelFilter::Error,
        Some("warn") => log::LevelFilter::Warn,
        Some("info") | Some("") | None => log::LevelFilter::Info,
        Some("debug") => log::LevelFilter::Debug,
        Some("trace") => log::LevelFilter::Trace,
        Some(level) => panic!("invalid log level: {}", level),
    }
}
