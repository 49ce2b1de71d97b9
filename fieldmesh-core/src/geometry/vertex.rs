use serde::{Deserialize, Serialize};

use crate::{dual::Dual, geometry::edge::EdgeInfo, r2::R2};

/// Boundary edge a mesh point was derived from: edge `edge` of piece
/// `piece` runs from vertex `edge` to vertex `edge + 1` (cyclically).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    pub piece: usize,
    pub edge: usize,
}

/// A boundary point of a [`Shape`](crate::geometry::shape::Shape), or a point of a mesh.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Vertex {
    pub p: R2<Dual>,
    /// Classification of the edges this point sits on.
    #[serde(default)]
    pub e: EdgeInfo,
    /// Only set on mesh points that lie on the shape boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Vertex {
    pub fn new(x: impl Into<Dual>, y: impl Into<Dual>) -> Self {
        Vertex { p: R2 { x: x.into(), y: y.into() }, e: EdgeInfo::default(), origin: None }
    }
    pub fn v(&self) -> R2<f64> {
        self.p.v()
    }
}

impl From<R2<Dual>> for Vertex {
    fn from(p: R2<Dual>) -> Self {
        Vertex { p, e: EdgeInfo::default(), origin: None }
    }
}

/// Position values and edge classification; derivatives and origin are ignored.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.v() == other.v() && self.e == other.e
    }
}
