//! Incremental Delaunay triangulation with constrained edges.
//!
//! Points are inserted Bowyer-Watson style into a large enclosing triangle
//! whose three corners occupy vertex slots 0..3. Cavities never grow across
//! a constrained edge.

use std::collections::{HashMap, HashSet};

use super::predicates::{incircle, orient2d, P};

/// Number of enclosing-triangle vertices ahead of the real ones.
pub const SUPER: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct Tri {
    /// Counterclockwise corners.
    pub v: [usize; 3],
    /// `n[i]` is the triangle across the edge opposite `v[i]`.
    pub n: [Option<usize>; 3],
    pub alive: bool,
}

impl Tri {
    /// Edge opposite corner `i`, in counterclockwise order.
    pub fn edge(&self, i: usize) -> (usize, usize) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertError {
    /// Outside the enclosing triangle.
    Outside,
    /// Coincides with an existing vertex.
    Duplicate(usize),
    /// The cavity could not be made star-shaped around the point.
    Degenerate,
}

pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Cavity boundary edge (a, b), the triangle outside it, and the cavity triangle inside it.
type BoundaryEdge = (usize, usize, Option<usize>, usize);

pub struct Triangulation {
    pub verts: Vec<P>,
    pub tris: Vec<Tri>,
    free: Vec<usize>,
    vert_tri: Vec<usize>,
    hint: usize,
    constrained: HashSet<(usize, usize)>,
    /// Triangles made by the last successful insertion.
    pub created: Vec<usize>,
}

impl Triangulation {
    /// Empty triangulation whose enclosing triangle comfortably covers the box.
    pub fn new(min: P, max: P) -> Self {
        let cx = (min[0] + max[0]) / 2.;
        let cy = (min[1] + max[1]) / 2.;
        let mut d = (max[0] - min[0]).max(max[1] - min[1]);
        if !(d > 0.) {
            d = 1.;
        }
        Triangulation {
            verts: vec![[cx - 20. * d, cy - 10. * d], [cx + 20. * d, cy - 10. * d], [cx, cy + 20. * d]],
            tris: vec![Tri { v: [0, 1, 2], n: [None; 3], alive: true }],
            free: vec![],
            vert_tri: vec![0, 0, 0],
            hint: 0,
            constrained: HashSet::new(),
            created: vec![0],
        }
    }

    pub fn is_super(v: usize) -> bool {
        v < SUPER
    }

    pub fn constrain(&mut self, a: usize, b: usize) {
        self.constrained.insert(edge_key(a, b));
    }

    pub fn unconstrain(&mut self, a: usize, b: usize) {
        self.constrained.remove(&edge_key(a, b));
    }

    pub fn is_constrained(&self, a: usize, b: usize) -> bool {
        self.constrained.contains(&edge_key(a, b))
    }

    pub fn live(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.tris.len()).filter(|&t| self.tris[t].alive)
    }

    pub fn corners(&self, t: usize) -> [P; 3] {
        let [a, b, c] = self.tris[t].v;
        [self.verts[a], self.verts[b], self.verts[c]]
    }

    fn contains(&self, t: usize, p: &P) -> bool {
        let [a, b, c] = self.corners(t);
        orient2d(&a, &b, p) >= 0. && orient2d(&b, &c, p) >= 0. && orient2d(&c, &a, p) >= 0.
    }

    /// Triangle containing `p` (on its boundary counts).
    pub fn locate(&self, p: &P) -> Option<usize> {
        let mut t = if self.tris.get(self.hint).map_or(false, |t| t.alive) {
            self.hint
        } else {
            self.live().next()?
        };
        let limit = 4 * self.tris.len() + 16;
        'walk: for step in 0..limit {
            let tri = &self.tris[t];
            for k in 0..3 {
                // Rotating the first edge tried keeps the walk from cycling.
                let i = (k + step) % 3;
                let (a, b) = tri.edge(i);
                if orient2d(&self.verts[a], &self.verts[b], p) < 0. {
                    match tri.n[i] {
                        Some(nb) => {
                            t = nb;
                            continue 'walk;
                        }
                        None => return None,
                    }
                }
            }
            return Some(t);
        }
        self.live().find(|&t| self.contains(t, p))
    }

    fn alloc(&mut self) -> usize {
        match self.free.pop() {
            Some(t) => t,
            None => {
                self.tris.push(Tri { v: [0; 3], n: [None; 3], alive: false });
                self.tris.len() - 1
            }
        }
    }

    fn cavity_boundary(&self, cavity: &[usize], in_cavity: &HashSet<usize>) -> Vec<BoundaryEdge> {
        let mut boundary = vec![];
        for &t in cavity {
            let tri = &self.tris[t];
            for i in 0..3 {
                if tri.n[i].map_or(true, |nb| !in_cavity.contains(&nb)) {
                    let (a, b) = tri.edge(i);
                    boundary.push((a, b, tri.n[i], t));
                }
            }
        }
        boundary
    }

    /// Insert `p`, returning its vertex index. Nothing changes on error.
    pub fn insert(&mut self, p: P) -> Result<usize, InsertError> {
        let t0 = self.locate(&p).ok_or(InsertError::Outside)?;
        if let Some(&v) = self.tris[t0].v.iter().find(|&&v| self.verts[v] == p) {
            return Err(InsertError::Duplicate(v));
        }

        let mut in_cavity: HashSet<usize> = HashSet::from([t0]);
        let mut cavity = vec![t0];
        let mut stack = vec![t0];
        while let Some(t) = stack.pop() {
            for i in 0..3 {
                let Some(nb) = self.tris[t].n[i] else { continue };
                if in_cavity.contains(&nb) {
                    continue;
                }
                let (a, b) = self.tris[t].edge(i);
                if self.is_constrained(a, b) {
                    continue;
                }
                let [x, y, z] = self.corners(nb);
                if incircle(&x, &y, &z, &p) > 0. {
                    in_cavity.insert(nb);
                    cavity.push(nb);
                    stack.push(nb);
                }
            }
        }

        // Every boundary edge must face p; grow the cavity until they do.
        let boundary = loop {
            let boundary = self.cavity_boundary(&cavity, &in_cavity);
            let mut grew = false;
            for &(a, b, nb, _) in &boundary {
                if orient2d(&p, &self.verts[a], &self.verts[b]) > 0. {
                    continue;
                }
                match nb {
                    Some(nb) if !self.is_constrained(a, b) => {
                        if in_cavity.insert(nb) {
                            cavity.push(nb);
                        }
                        grew = true;
                    }
                    _ => return Err(InsertError::Degenerate),
                }
            }
            if !grew {
                break boundary;
            }
        };

        let mut by_a: HashMap<usize, usize> = HashMap::with_capacity(boundary.len());
        let mut by_b: HashMap<usize, usize> = HashMap::with_capacity(boundary.len());
        for (k, &(a, b, _, _)) in boundary.iter().enumerate() {
            if by_a.insert(a, k).is_some() || by_b.insert(b, k).is_some() {
                return Err(InsertError::Degenerate);
            }
        }
        if boundary.iter().any(|(_, b, _, _)| !by_a.contains_key(b)) {
            return Err(InsertError::Degenerate);
        }
        // A vertex enclosed by the cavity would be lost.
        if cavity.iter().any(|&t| self.tris[t].v.iter().any(|v| !by_a.contains_key(v))) {
            return Err(InsertError::Degenerate);
        }
        let mut fixes = Vec::with_capacity(boundary.len());
        for (k, &(_, _, nb, old)) in boundary.iter().enumerate() {
            if let Some(nb) = nb {
                let j = self.tris[nb].n.iter().position(|x| *x == Some(old)).ok_or(InsertError::Degenerate)?;
                fixes.push((nb, j, k));
            }
        }

        let pv = self.verts.len();
        self.verts.push(p);
        self.vert_tri.push(0);
        let m = boundary.len();
        let mut slots: Vec<usize> = cavity.iter().take(m).cloned().collect();
        for &t in cavity.iter().skip(m) {
            self.tris[t].alive = false;
            self.free.push(t);
        }
        while slots.len() < m {
            let t = self.alloc();
            slots.push(t);
        }
        for (k, &(a, b, nb, _)) in boundary.iter().enumerate() {
            let next = slots[by_a[&b]];
            let prev = slots[by_b[&a]];
            self.tris[slots[k]] = Tri { v: [pv, a, b], n: [nb, Some(next), Some(prev)], alive: true };
        }
        for (nb, j, k) in fixes {
            self.tris[nb].n[j] = Some(slots[k]);
        }
        for &t in &slots {
            for v in self.tris[t].v {
                self.vert_tri[v] = t;
            }
        }
        self.hint = slots[0];
        self.created = slots;
        Ok(pv)
    }

    /// Live triangles around vertex `a`.
    pub fn around(&self, a: usize) -> Vec<usize> {
        let start = self.vert_tri[a];
        let corner = |t: usize| self.tris[t].v.iter().position(|&v| v == a);
        let mut out = vec![start];
        let mut t = start;
        let mut closed = false;
        for _ in 0..self.tris.len() {
            let Some(i) = corner(t) else { break };
            match self.tris[t].n[(i + 2) % 3] {
                Some(nb) if nb == start => {
                    closed = true;
                    break;
                }
                Some(nb) => {
                    out.push(nb);
                    t = nb;
                }
                None => break,
            }
        }
        if !closed {
            t = start;
            for _ in 0..self.tris.len() {
                let Some(i) = corner(t) else { break };
                match self.tris[t].n[(i + 1) % 3] {
                    Some(nb) if !out.contains(&nb) => {
                        out.push(nb);
                        t = nb;
                    }
                    _ => break,
                }
            }
        }
        out
    }

    /// Third corners of the triangles on either side of edge ab, or `None`
    /// if ab is not an edge.
    pub fn apexes(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        let mut found = false;
        let mut apexes = vec![];
        for t in self.around(a) {
            let v = self.tris[t].v;
            if v.contains(&b) {
                found = true;
                if let Some(&c) = v.iter().find(|&&c| c != a && c != b) {
                    apexes.push(c);
                }
            }
        }
        found.then_some(apexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn check(tr: &Triangulation) {
        for t in tr.live() {
            let tri = tr.tris[t];
            let [a, b, c] = tr.corners(t);
            assert!(orient2d(&a, &b, &c) > 0., "triangle {} is not counterclockwise", t);
            for i in 0..3 {
                if let Some(nb) = tri.n[i] {
                    assert!(tr.tris[nb].alive);
                    let (x, y) = tri.edge(i);
                    assert!(tr.tris[nb].v.contains(&x) && tr.tris[nb].v.contains(&y));
                    assert!(tr.tris[nb].n.contains(&Some(t)));
                }
            }
        }
    }

    #[test]
    fn insert_grid() {
        let mut tr = Triangulation::new([0., 0.], [1., 1.]);
        for i in 0..5 {
            for j in 0..5 {
                tr.insert([i as f64 / 4., j as f64 / 4.]).unwrap();
            }
        }
        check(&tr);
        // Euler: 3 + 25 points in the enclosing triangle make 2 * 25 + 1 triangles.
        assert_eq!(tr.live().count(), 51);
        assert_eq!(tr.insert([0.5, 0.5]), Err(InsertError::Duplicate(SUPER + 12)));
        // Every interior point is surrounded.
        let around = tr.around(SUPER + 12);
        assert_eq!(around.len(), around.iter().collect::<HashSet<_>>().len());
        assert!(around.len() >= 3);
        assert!(tr.apexes(SUPER + 12, SUPER + 13).is_some());
        assert!(tr.apexes(SUPER, SUPER + 24).is_none());
    }

    #[test]
    fn constrained_edge_survives() {
        let mut tr = Triangulation::new([0., 0.], [2., 2.]);
        for p in [[0., 0.], [2., 0.], [2., 2.], [0., 2.]] {
            tr.insert(p).unwrap();
        }
        let diag = if tr.apexes(SUPER, SUPER + 2).is_some() { (SUPER, SUPER + 2) } else { (SUPER + 1, SUPER + 3) };
        tr.constrain(diag.0, diag.1);
        // Would flip the diagonal if it were free.
        tr.insert([1.9, 0.2]).unwrap();
        tr.insert([0.1, 1.8]).unwrap();
        check(&tr);
        assert!(tr.apexes(diag.0, diag.1).is_some());
    }

    #[test]
    fn outside() {
        let mut tr = Triangulation::new([0., 0.], [1., 1.]);
        assert_eq!(tr.insert([1e6, 1e6]), Err(InsertError::Outside));
    }
}
