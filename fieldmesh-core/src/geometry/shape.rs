use std::f64::consts::PI;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    dual::Dual,
    error::GeometryError,
    geometry::{
        edge::EdgeKind,
        material::Material,
        polygon::{any_point_in_poly, distance_to_segment, segments_cross, signed_area, winding_number, Containment},
        vertex::{Origin, Vertex},
    },
    r2::R2,
};

/// One closed boundary: counterclockwise (positive area) outlines a region,
/// clockwise (negative area) outlines a hole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub points: Vec<Vertex>,
    #[serde(default)]
    pub material: Material,
}

impl Piece {
    pub fn new(points: Vec<Vertex>, material: Material) -> Self {
        Piece { points, material }
    }
    pub fn area(&self) -> Dual {
        signed_area(&self.points)
    }
    pub fn is_hole(&self) -> bool {
        self.area().v() < 0.
    }
    /// Edges as (start, end) pairs, closing back to the first point.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> + '_ {
        self.points.iter().circular_tuple_windows()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: R2<Dual>,
    pub max: R2<Dual>,
}

/// A planar domain: an ordered list of pieces, each tagged with a material.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub pieces: Vec<Piece>,
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    /// Counterclockwise rectangle with the given opposite corners.
    pub fn rectangle(x1: impl Into<Dual>, y1: impl Into<Dual>, x2: impl Into<Dual>, y2: impl Into<Dual>) -> Self {
        let (x1, y1, x2, y2) = (x1.into(), y1.into(), x2.into(), y2.into());
        let (x1, x2) = if x2.v() < x1.v() { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y2.v() < y1.v() { (y2, y1) } else { (y1, y2) };
        let mut s = Shape::new();
        s.add_point(x1, y1);
        s.add_point(x2, y1);
        s.add_point(x2, y2);
        s.add_point(x1, y2);
        s
    }

    /// Counterclockwise regular `n`-gon inscribed in the given circle.
    pub fn circle(cx: impl Into<Dual>, cy: impl Into<Dual>, r: impl Into<Dual>, n: usize) -> Self {
        let (cx, cy, r) = (cx.into(), cy.into(), r.into());
        let mut s = Shape::new();
        for i in 0..n.max(3) {
            let theta = 2. * PI * i as f64 / n.max(3) as f64;
            s.add_point(cx + r * theta.cos(), cy + r * theta.sin());
        }
        s
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, n: usize) -> &[Vertex] {
        &self.pieces[n].points
    }

    pub fn material(&self, n: usize) -> &Material {
        &self.pieces[n].material
    }

    /// Shape made of piece `n` alone.
    pub fn piece_shape(&self, n: usize) -> Shape {
        Shape { pieces: vec![self.pieces[n].clone()] }
    }

    /// Replace this shape with piece `n` of `other`.
    pub fn set_to_piece(&mut self, other: &Shape, n: usize) {
        self.pieces = vec![other.pieces[n].clone()];
    }

    pub fn with_material(mut self, material: Material) -> Self {
        for piece in &mut self.pieces {
            piece.material = material.clone();
        }
        self
    }

    /// Append a point to the last piece, starting one if there are none.
    pub fn add_point(&mut self, x: impl Into<Dual>, y: impl Into<Dual>) {
        if self.pieces.is_empty() {
            self.pieces.push(Piece::default());
        }
        if let Some(piece) = self.pieces.last_mut() {
            piece.points.push(Vertex::new(x, y));
        }
    }

    pub fn add_piece(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Turn the last piece into a closed zero-area polyline by walking back
    /// over its interior points.
    pub fn make_polyline(&mut self) {
        if let Some(piece) = self.pieces.last_mut() {
            let n = piece.points.len();
            if n >= 3 {
                let back: Vec<Vertex> = piece.points[1..n - 1].iter().rev().cloned().collect();
                piece.points.extend(back);
            }
        }
    }

    pub fn area(&self, n: usize) -> Dual {
        self.pieces[n].area()
    }

    /// Sum of signed piece areas, i.e. outlines minus holes.
    pub fn total_area(&self) -> Dual {
        self.pieces.iter().map(Piece::area).sum()
    }

    /// True if piece `n` is counterclockwise (or has zero area).
    pub fn orientation(&self, n: usize) -> bool {
        self.area(n).v() >= 0.
    }

    /// Smallest angle at any vertex, measured on the domain side of the
    /// boundary. 0 is the sharpest possible, `None` for an empty shape.
    pub fn sharpest_angle(&self) -> Option<Dual> {
        let mut sharpest: Option<Dual> = None;
        for piece in &self.pieces {
            let n = piece.points.len();
            if n < 3 {
                continue;
            }
            for i in 0..n {
                let v = piece.points[i].p;
                let a = piece.points[(i + 1) % n].p - v;
                let b = piece.points[(i + n - 1) % n].p - v;
                let mut theta = a.cross(&b).atan2(a.dot(&b));
                if theta.v() < 0. {
                    theta = theta + 2. * PI;
                }
                sharpest = Some(sharpest.map_or(theta, |s| s.min(theta)));
            }
        }
        sharpest
    }

    /// Shortest and longest edge lengths.
    pub fn extreme_side_lengths(&self) -> Option<(Dual, Dual)> {
        self.pieces
            .iter()
            .flat_map(|piece| piece.edges().map(|(a, b)| (b.p - a.p).norm()))
            .fold(None, |acc, len| match acc {
                None => Some((len, len)),
                Some((lo, hi)) => Some((lo.min(len), hi.max(len))),
            })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.pieces.iter().flat_map(|piece| piece.points.iter());
        let first = points.next()?.p;
        Some(points.fold(Bounds { min: first, max: first }, |b, v| Bounds {
            min: R2 { x: b.min.x.min(v.p.x), y: b.min.y.min(v.p.y) },
            max: R2 { x: b.max.x.max(v.p.x), y: b.max.y.max(v.p.y) },
        }))
    }

    /// Whether (x, y) is inside the shape. Points inside holes are outside;
    /// points on any piece's boundary are [`Containment::Boundary`].
    pub fn contains(&self, x: f64, y: f64) -> Containment {
        let p = R2::new(x, y);
        let tol = 1e-12 * (1. + x.abs() + y.abs());
        let mut winding = 0;
        for piece in &self.pieces {
            if piece.edges().any(|(a, b)| distance_to_segment(&p, &a.v(), &b.v()).0 <= tol) {
                return Containment::Boundary;
            }
            let ring: Vec<R2<f64>> = piece.points.iter().map(Vertex::v).collect();
            winding += winding_number(&ring, &p);
        }
        if winding != 0 { Containment::Inside } else { Containment::Outside }
    }

    /// Some point strictly inside the first non-hole piece, avoiding holes.
    pub fn a_point_inside(&self) -> Option<R2<f64>> {
        let holes: Vec<Vertex> = self
            .pieces
            .iter()
            .filter(|piece| piece.is_hole())
            .flat_map(|piece| piece.points.iter().cloned())
            .collect();
        let piece = self.pieces.iter().find(|piece| piece.area().v() > 0.)?;
        let mut poly = piece.points.clone();
        poly.extend(holes);
        any_point_in_poly(&poly, Some(piece.points.len()))
    }

    /// First problem that would make this shape unmeshable, if any.
    pub fn geometry_error(&self, enforce_positive_area: bool) -> Option<GeometryError> {
        if self.pieces.is_empty() {
            return Some(GeometryError::Empty);
        }
        for (i, piece) in self.pieces.iter().enumerate() {
            let n = piece.points.len();
            if n < 3 {
                return Some(GeometryError::TooFewPoints { piece: i, count: n });
            }
            if let Some(j) = piece.points.iter().position(|v| !v.p.x.is_finite() || !v.p.y.is_finite()) {
                return Some(GeometryError::NonFinite { piece: i, vertex: j });
            }
            if let Some(j) = (0..n).find(|&j| piece.points[j].v() == piece.points[(j + 1) % n].v()) {
                return Some(GeometryError::ZeroLengthEdge { piece: i, vertex: j });
            }
        }
        if let Some(err) = self.crossing_edges() {
            return Some(err);
        }
        if enforce_positive_area {
            if let Some(i) = self.pieces.iter().position(|piece| piece.area().v() == 0.) {
                return Some(GeometryError::ZeroArea { piece: i });
            }
            let area = self.total_area().v();
            if area <= 0. {
                return Some(GeometryError::NegativeArea { area });
            }
        }
        None
    }

    fn crossing_edges(&self) -> Option<GeometryError> {
        struct Edge {
            piece: usize,
            edge: usize,
            a: R2<f64>,
            b: R2<f64>,
        }
        let edges: Vec<Edge> = self
            .pieces
            .iter()
            .enumerate()
            .flat_map(|(i, piece)| {
                piece.edges().enumerate().map(move |(j, (a, b))| Edge { piece: i, edge: j, a: a.v(), b: b.v() })
            })
            .collect();
        for (k, e1) in edges.iter().enumerate() {
            for e2 in &edges[k + 1..] {
                if e1.a.x.max(e1.b.x) < e2.a.x.min(e2.b.x)
                    || e2.a.x.max(e2.b.x) < e1.a.x.min(e1.b.x)
                    || e1.a.y.max(e1.b.y) < e2.a.y.min(e2.b.y)
                    || e2.a.y.max(e2.b.y) < e1.a.y.min(e1.b.y)
                {
                    continue;
                }
                if segments_cross(&e1.a, &e1.b, &e2.a, &e2.b) {
                    return Some(GeometryError::EdgesCross {
                        piece1: e1.piece,
                        edge1: e1.edge,
                        piece2: e2.piece,
                        edge2: e2.edge,
                    });
                }
            }
        }
        None
    }

    /// Classify edge `edge` of piece `piece` (from vertex `edge` to the next).
    ///
    /// Distances along every run of consecutive edges of `kind` in the piece
    /// are recomputed so they go from 0 to 1.
    pub fn assign_port(&mut self, piece: usize, edge: usize, kind: EdgeKind) -> Result<(), GeometryError> {
        let n = self.pieces.get(piece).map_or(0, |p| p.points.len());
        if edge >= n {
            return Err(GeometryError::NoSuchEdge { piece, edge });
        }
        let next = (edge + 1) % n;
        let points = &mut self.pieces[piece].points;
        let existing = points[edge].e.shared_kind(&points[next].e).kind;
        if existing == kind {
            return Ok(());
        }
        if !existing.is_default() || !points[edge].e.can_take(kind) || !points[next].e.can_take(kind) {
            return Err(GeometryError::EdgeKindConflict { piece, edge, existing, requested: kind });
        }
        points[edge].e.set(kind, 0.);
        points[next].e.set(kind, 1.);
        self.parameterize(piece, kind);
        debug!("piece {} edge {} is now {:?}", piece, edge, kind);
        Ok(())
    }

    fn parameterize(&mut self, piece: usize, kind: EdgeKind) {
        let points = &mut self.pieces[piece].points;
        let n = points.len();
        let on: Vec<bool> = (0..n).map(|i| points[i].e.has(kind) && points[(i + 1) % n].e.has(kind)).collect();
        let starts: Vec<usize> = if on.iter().all(|x| *x) {
            vec![0]
        } else {
            (0..n).filter(|&i| on[i] && !on[(i + n - 1) % n]).collect()
        };
        for start in starts {
            let mut run = vec![start];
            let mut lengths = vec![0.];
            let mut k = start;
            while on[k] && run.len() <= n {
                let next = (k + 1) % n;
                let len = (points[next].v() - points[k].v()).norm();
                lengths.push(lengths[lengths.len() - 1] + len);
                run.push(next);
                k = next;
                if k == start {
                    break;
                }
            }
            let total = lengths[lengths.len() - 1];
            for (idx, cum) in run.iter().zip(lengths.iter()) {
                if *idx == start && *cum > 0. {
                    continue;
                }
                let dist = if total > 0. { cum / total } else { 0. };
                points[*idx].e.set(kind, dist);
            }
        }
    }

    pub fn offset(&mut self, dx: impl Into<Dual>, dy: impl Into<Dual>) {
        let (dx, dy) = (dx.into(), dy.into());
        self.map_points(|p| R2 { x: p.x + dx, y: p.y + dy });
    }

    pub fn scale(&mut self, sx: impl Into<Dual>, sy: impl Into<Dual>) {
        let (sx, sy) = (sx.into(), sy.into());
        self.map_points(|p| R2 { x: p.x * sx, y: p.y * sy });
        if sx.v() * sy.v() < 0. {
            self.reverse();
        }
    }

    /// Rotate about the origin by `degrees`, counterclockwise.
    pub fn rotate(&mut self, degrees: impl Into<Dual>) {
        let theta = degrees.into() * (PI / 180.);
        let (c, s) = (theta.cos(), theta.sin());
        self.map_points(|p| R2 { x: p.x * c - p.y * s, y: p.x * s + p.y * c });
    }

    /// Reflect about the vertical line through `x0`.
    pub fn mirror_x(&mut self, x0: impl Into<Dual>) {
        let x0 = x0.into();
        self.map_points(|p| R2 { x: x0 * 2. - p.x, y: p.y });
        self.reverse();
    }

    /// Reflect about the horizontal line through `y0`.
    pub fn mirror_y(&mut self, y0: impl Into<Dual>) {
        let y0 = y0.into();
        self.map_points(|p| R2 { x: p.x, y: y0 * 2. - p.y });
        self.reverse();
    }

    /// Reverse every piece, turning outlines into holes and back.
    pub fn reverse(&mut self) {
        for piece in &mut self.pieces {
            piece.points.reverse();
        }
    }

    fn map_points(&mut self, f: impl Fn(R2<Dual>) -> R2<Dual>) {
        for piece in &mut self.pieces {
            for v in &mut piece.points {
                v.p = f(v.p);
            }
        }
    }

    /// Edge nearest to (x, y).
    pub fn find_closest_edge(&self, x: f64, y: f64) -> Option<Origin> {
        let p = R2::new(x, y);
        self.pieces
            .iter()
            .enumerate()
            .flat_map(|(i, piece)| {
                piece.edges().enumerate().map(move |(j, (a, b))| (Origin { piece: i, edge: j }, a.v(), b.v()))
            })
            .map(|(origin, a, b)| (origin, distance_to_segment(&p, &a, &b).0))
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(origin, _)| origin)
    }

    /// (piece, vertex) of the vertex nearest to (x, y).
    pub fn find_closest_vertex(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let p = R2::new(x, y);
        self.pieces
            .iter()
            .enumerate()
            .flat_map(|(i, piece)| piece.points.iter().enumerate().map(move |(j, v)| ((i, j), (v.v() - p).norm2())))
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(idx, _)| idx)
    }

    /// Drop vertices closer than `threshold` to the previously kept one, and
    /// pieces left with fewer than 3 points. Returns the number of vertices removed.
    pub fn clean(&mut self, threshold: f64) -> usize {
        let before: usize = self.pieces.iter().map(|p| p.points.len()).sum();
        for piece in &mut self.pieces {
            let mut kept: Vec<Vertex> = Vec::with_capacity(piece.points.len());
            for v in &piece.points {
                match kept.last() {
                    Some(last) if (v.v() - last.v()).norm() < threshold => {}
                    _ => kept.push(*v),
                }
            }
            while kept.len() > 1 && (kept[0].v() - kept[kept.len() - 1].v()).norm() < threshold {
                kept.pop();
            }
            piece.points = kept;
        }
        self.pieces.retain(|p| p.points.len() >= 3);
        let after: usize = self.pieces.iter().map(|p| p.points.len()).sum();
        before - after
    }
}
