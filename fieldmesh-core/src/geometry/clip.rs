//! Boolean combination of shapes, carrying materials, derivatives and edge
//! kinds across the clip.

use std::collections::BTreeMap;

use geo::{
    orient::{Direction, Orient},
    BooleanOps, Coord, LineString, MultiPolygon, Polygon,
};
use log::debug;
use ordered_float::OrderedFloat;

use crate::{
    dual::Dual,
    geometry::{
        edge::EdgeInfo,
        material::Material,
        polygon::distance_to_segment,
        shape::{Piece, Shape},
        vertex::Vertex,
    },
    r2::R2,
};

type Key = (OrderedFloat<f64>, OrderedFloat<f64>);

fn key(p: &R2<f64>) -> Key {
    (OrderedFloat(p.x), OrderedFloat(p.y))
}

fn ring(points: &[Vertex]) -> LineString<f64> {
    LineString::new(points.iter().map(|v| Coord { x: v.p.x.v(), y: v.p.y.v() }).collect())
}

fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![])
}

/// Area covered by `pieces`: outlines united, then holes cut out.
fn region<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> MultiPolygon<f64> {
    let mut outlines = empty();
    let mut holes = empty();
    for piece in pieces {
        let area = piece.area().v();
        if area == 0. {
            debug!("skipping zero-area piece with {} points", piece.points.len());
            continue;
        }
        let polygon = Polygon::new(ring(&piece.points), vec![]).orient(Direction::Default);
        let single = MultiPolygon::new(vec![polygon]);
        if area > 0. {
            outlines = outlines.union(&single);
        } else {
            holes = holes.union(&single);
        }
    }
    if holes.0.is_empty() { outlines } else { outlines.difference(&holes) }
}

/// Regions keyed by material, in order of first appearance.
#[derive(Default)]
struct Groups(Vec<(Material, MultiPolygon<f64>)>);

impl Groups {
    fn add(&mut self, material: &Material, area: MultiPolygon<f64>) {
        match self.0.iter_mut().find(|(m, _)| m == material) {
            Some((_, existing)) => *existing = existing.union(&area),
            None => self.0.push((material.clone(), area)),
        }
    }

    fn into_shape(self, sources: &[&Shape]) -> Shape {
        let recovery = Recovery::new(sources);
        let mut shape = Shape::new();
        for (material, area) in self.0 {
            for polygon in area.orient(Direction::Default).0 {
                for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
                    let mut coords: Vec<Coord<f64>> = ring.0.clone();
                    if coords.len() > 1 && coords.first() == coords.last() {
                        coords.pop();
                    }
                    if coords.len() < 3 {
                        continue;
                    }
                    let points = coords.into_iter().map(|c| recovery.vertex(c)).collect();
                    shape.add_piece(Piece::new(points, material.clone()));
                }
            }
        }
        shape
    }
}

/// Recovers derivative and edge information for clipped vertices from the
/// shapes they were clipped from.
struct Recovery {
    exact: BTreeMap<Key, Vertex>,
    edges: Vec<(Vertex, Vertex)>,
    tolerance: f64,
}

impl Recovery {
    fn new(sources: &[&Shape]) -> Self {
        let mut exact = BTreeMap::new();
        let mut edges = Vec::new();
        let mut extent: f64 = 1.;
        for shape in sources {
            for piece in shape.pieces() {
                for (a, b) in piece.edges() {
                    let mut v = *a;
                    v.origin = None;
                    exact.entry(key(&v.v())).or_insert(v);
                    edges.push((*a, *b));
                    extent = extent.max(a.p.x.v().abs()).max(a.p.y.v().abs());
                }
            }
        }
        Recovery { exact, edges, tolerance: 1e-9 * extent }
    }

    fn vertex(&self, c: Coord<f64>) -> Vertex {
        let p = R2::new(c.x, c.y);
        if let Some(v) = self.exact.get(&key(&p)) {
            return *v;
        }
        if let Some(v) = self.exact.values().find(|v| (v.v() - p).norm() <= self.tolerance) {
            return *v;
        }
        let on: Vec<&(Vertex, Vertex)> = self
            .edges
            .iter()
            .filter(|(a, b)| distance_to_segment(&p, &a.v(), &b.v()).0 <= self.tolerance)
            .collect();
        let e = on
            .iter()
            .find_map(|(a, b)| {
                let shared = a.e.shared_kind(&b.e);
                if shared.kind.is_default() {
                    return None;
                }
                let t = distance_to_segment(&p, &a.v(), &b.v()).1;
                Some(EdgeInfo::new(shared.kind, shared.dist1 + t * (shared.dist2 - shared.dist1)))
            })
            .unwrap_or_default();
        for (i, e1) in on.iter().enumerate() {
            for e2 in &on[i + 1..] {
                if let Some(x) = intersection(e1, e2) {
                    let mut v = Vertex::new(Dual::new(c.x, x.x.d()), Dual::new(c.y, x.y.d()));
                    v.e = e;
                    return v;
                }
            }
        }
        if let Some((a, b)) = on.first() {
            let t = distance_to_segment(&p, &a.v(), &b.v()).1;
            let d = a.p.d() * (1. - t) + b.p.d() * t;
            let mut v = Vertex::new(Dual::new(c.x, d.x), Dual::new(c.y, d.y));
            v.e = e;
            return v;
        }
        Vertex::new(c.x, c.y)
    }
}

/// Crossing point of the lines through two edges, with derivatives.
fn intersection((a, b): &(Vertex, Vertex), (c, d): &(Vertex, Vertex)) -> Option<R2<Dual>> {
    let r = b.p - a.p;
    let s = d.p - c.p;
    let denom = r.cross(&s);
    if denom.v().abs() <= 1e-12 * r.v().norm() * s.v().norm() {
        return None;
    }
    let t = (c.p - a.p).cross(&s) / denom;
    Some(a.p + r * t)
}

impl Shape {
    fn material_groups(&self) -> Vec<(&Material, Vec<&Piece>)> {
        let mut groups: Vec<(&Material, Vec<&Piece>)> = Vec::new();
        for piece in &self.pieces {
            match groups.iter_mut().find(|(m, _)| **m == piece.material) {
                Some((_, pieces)) => pieces.push(piece),
                None => groups.push((&piece.material, vec![piece])),
            }
        }
        groups
    }

    /// Holes only cut into outlines of their own material.
    fn region(&self) -> MultiPolygon<f64> {
        self.material_groups()
            .into_iter()
            .fold(empty(), |acc, (_, pieces)| acc.union(&region(pieces)))
    }

    /// Area covered by both shapes, keeping this shape's materials.
    pub fn intersection(&self, other: &Shape) -> Shape {
        let mask = other.region();
        let mut groups = Groups::default();
        for (material, pieces) in self.material_groups() {
            groups.add(material, region(pieces).intersection(&mask));
        }
        groups.into_shape(&[self, other])
    }

    /// Area covered by either shape. Where they overlap this shape's materials win.
    pub fn union(&self, other: &Shape) -> Shape {
        let mine = self.region();
        let mut groups = Groups::default();
        for (material, pieces) in self.material_groups() {
            groups.add(material, region(pieces));
        }
        for (material, pieces) in other.material_groups() {
            groups.add(material, region(pieces).difference(&mine));
        }
        groups.into_shape(&[self, other])
    }

    /// This shape with `other` cut out.
    pub fn difference(&self, other: &Shape) -> Shape {
        let mask = other.region();
        let mut groups = Groups::default();
        for (material, pieces) in self.material_groups() {
            groups.add(material, region(pieces).difference(&mask));
        }
        groups.into_shape(&[self, other])
    }

    /// Area covered by exactly one of the shapes, each part keeping its material.
    pub fn xor(&self, other: &Shape) -> Shape {
        let mine = self.region();
        let theirs = other.region();
        let mut groups = Groups::default();
        for (material, pieces) in self.material_groups() {
            groups.add(material, region(pieces).difference(&theirs));
        }
        for (material, pieces) in other.material_groups() {
            groups.add(material, region(pieces).difference(&mine));
        }
        groups.into_shape(&[self, other])
    }

    /// Give the part of this shape that `s` covers the material `material`,
    /// splitting pieces along the edge of `s`.
    pub fn paint(&mut self, s: &Shape, material: &Material) {
        let mask = s.region();
        let mut groups = Groups::default();
        for (m, pieces) in self.material_groups() {
            groups.add(m, region(pieces).difference(&mask));
        }
        groups.add(material, self.region().intersection(&mask));
        let painted = groups.into_shape(&[&*self, s]);
        *self = painted;
    }

    /// Single-material outline of the whole shape, with holes as separate
    /// clockwise pieces.
    pub fn merged(&self) -> Shape {
        let material = self.pieces.first().map(|p| p.material.clone()).unwrap_or_default();
        let mut groups = Groups::default();
        groups.add(&material, self.region());
        groups.into_shape(&[self])
    }
}
