pub mod clip;
pub mod edge;
pub mod material;
pub mod polygon;
pub mod shape;
pub mod vertex;
