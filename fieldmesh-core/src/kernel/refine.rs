use std::collections::BTreeMap;

use log::{debug, trace};

use super::{
    predicates::{circumcenter, dist2, encroaches, orient2d, P},
    triangulation::{edge_key, InsertError, Triangulation, SUPER},
    KernelInput, KernelOutput, Switches, Triangulator, UnsuitableFn,
};
use crate::error::KernelError;

/// In-process constrained Delaunay triangulator with Ruppert-style
/// refinement: segments are recovered by splitting, then triangles the
/// oracle rejects get their circumcenters inserted, splitting any segment a
/// circumcenter encroaches instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelaunayRefiner {
    pub max_points: usize,
}

impl Default for DelaunayRefiner {
    fn default() -> Self {
        DelaunayRefiner { max_points: 5_000_000 }
    }
}

impl DelaunayRefiner {
    pub fn new(max_points: usize) -> Self {
        DelaunayRefiner { max_points }
    }
}

impl Triangulator for DelaunayRefiner {
    fn triangulate(
        &self,
        switches: &Switches,
        input: &KernelInput,
        unsuitable: Option<UnsuitableFn>,
    ) -> Result<KernelOutput, KernelError> {
        if !switches.zero_based {
            return Err(KernelError::Unsupported(format!("one-based indices ({})", switches)));
        }
        validate(input)?;
        let mut run = Run::new(self.max_points, *switches, input);
        run.insert_points()?;
        if switches.pslg {
            run.recover()?;
        }
        run.classify();
        if switches.refine {
            if let Some(unsuitable) = unsuitable {
                run.refine(unsuitable)?;
            }
        }
        let output = run.output();
        debug!(
            "triangulate({}): {} points, {} segments -> {} points, {} triangles",
            switches,
            input.points.len(),
            input.segments.len(),
            output.points.len(),
            output.num_triangles(),
        );
        Ok(output)
    }
}

fn validate(input: &KernelInput) -> Result<(), KernelError> {
    let n = input.points.len();
    if n < 3 {
        return Err(KernelError::InvalidInput(format!("{} points", n)));
    }
    if input.point_markers.len() != n {
        return Err(KernelError::InvalidInput(format!(
            "{} point markers for {} points",
            input.point_markers.len(),
            n
        )));
    }
    if input.segment_markers.len() != input.segments.len() {
        return Err(KernelError::InvalidInput(format!(
            "{} segment markers for {} segments",
            input.segment_markers.len(),
            input.segments.len()
        )));
    }
    if let Some(p) = input.points.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(KernelError::InvalidInput(format!("non-finite point {:?}", p)));
    }
    if let Some(s) = input.segments.iter().find(|s| s[0] >= n || s[1] >= n) {
        return Err(KernelError::InvalidInput(format!("segment {:?} out of range", s)));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Region {
    Unset,
    Exterior,
    Hole,
    Attribute(f64),
}

impl Region {
    fn in_domain(self) -> bool {
        matches!(self, Region::Attribute(_))
    }
}

struct Run<'a> {
    tri: Triangulation,
    markers: Vec<i32>,
    /// Unsplit pieces of input segments, keyed by sorted endpoints.
    subsegs: BTreeMap<(usize, usize), i32>,
    region: Vec<Region>,
    input: &'a KernelInput,
    switches: Switches,
    max_points: usize,
    min_seg_len2: f64,
}

impl<'a> Run<'a> {
    fn new(max_points: usize, switches: Switches, input: &'a KernelInput) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in &input.points {
            for k in 0..2 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        let extent = (max[0] - min[0]).max(max[1] - min[1]);
        let mut subsegs = BTreeMap::new();
        for (s, &marker) in input.segments.iter().zip(&input.segment_markers) {
            if s[0] != s[1] {
                subsegs.entry(edge_key(s[0] + SUPER, s[1] + SUPER)).or_insert(marker);
            }
        }
        Run {
            tri: Triangulation::new(min, max),
            markers: vec![0; SUPER],
            subsegs,
            region: vec![],
            input,
            switches,
            max_points,
            min_seg_len2: (extent * 1e-10).powi(2),
        }
    }

    fn insert_points(&mut self) -> Result<(), KernelError> {
        for (i, (p, &marker)) in self.input.points.iter().zip(&self.input.point_markers).enumerate() {
            match self.tri.insert(*p) {
                Ok(_) => self.markers.push(marker),
                Err(InsertError::Duplicate(_)) => return Err(KernelError::DuplicatePoint(i)),
                Err(_) => return Err(KernelError::Degenerate { x: p[0], y: p[1] }),
            }
        }
        Ok(())
    }

    fn is_input(&self, v: usize) -> bool {
        v >= SUPER && v < SUPER + self.input.points.len()
    }

    /// A vertex lying strictly inside segment ab, next to one of its ends.
    fn vertex_on_segment(&self, a: usize, b: usize) -> Option<usize> {
        let (pa, pb) = (self.tri.verts[a], self.tri.verts[b]);
        let len2 = dist2(&pa, &pb);
        for end in [a, b] {
            for t in self.tri.around(end) {
                for &c in &self.tri.tris[t].v {
                    if c == a || c == b || Triangulation::is_super(c) {
                        continue;
                    }
                    let pc = self.tri.verts[c];
                    let along = (pc[0] - pa[0]) * (pb[0] - pa[0]) + (pc[1] - pa[1]) * (pb[1] - pa[1]);
                    if orient2d(&pa, &pb, &pc).abs() <= 1e-12 * len2 && along > 0. && along < len2 {
                        return Some(c);
                    }
                }
            }
        }
        None
    }

    /// Where to split ab, as a fraction from a. Splits next to an input
    /// vertex land a power of two away from it, so segments meeting at a
    /// small angle are cut at matching radii.
    fn split_fraction(&self, a: usize, b: usize) -> f64 {
        let len = dist2(&self.tri.verts[a], &self.tri.verts[b]).sqrt();
        let (from_a, from_b) = (self.is_input(a), self.is_input(b));
        if from_a == from_b {
            return 0.5;
        }
        let mut p2 = 2f64.powi(len.log2().floor() as i32);
        while p2 > len * 2. / 3. {
            p2 /= 2.;
        }
        while p2 < len / 3. {
            p2 *= 2.;
        }
        let t = p2 / len;
        if from_a { t } else { 1. - t }
    }

    fn split(&mut self, key: (usize, usize), marker: i32, queue: &mut Vec<(usize, usize)>) -> Result<usize, KernelError> {
        let (a, b) = key;
        let (pa, pb) = (self.tri.verts[a], self.tri.verts[b]);
        let too_short = KernelError::SegmentTooShort { ax: pa[0], ay: pa[1], bx: pb[0], by: pb[1] };
        if dist2(&pa, &pb) <= self.min_seg_len2 {
            return Err(too_short);
        }
        if self.tri.verts.len() >= self.max_points + SUPER {
            return Err(KernelError::TooManyPoints(self.max_points));
        }
        let t = self.split_fraction(a, b);
        let p = [pa[0] + t * (pb[0] - pa[0]), pa[1] + t * (pb[1] - pa[1])];
        self.subsegs.remove(&key);
        self.tri.unconstrain(a, b);
        let m = match self.tri.insert(p) {
            Ok(m) => m,
            Err(InsertError::Duplicate(_)) => return Err(too_short),
            Err(_) => return Err(KernelError::Degenerate { x: p[0], y: p[1] }),
        };
        trace!("split segment ({}, {}) at {:?}", a - SUPER, b - SUPER, p);
        self.markers.push(marker);
        self.replace(key, m, marker, queue);
        // Segments facing the new vertex may now be encroached.
        for t in self.tri.around(m) {
            let tri = self.tri.tris[t];
            if let Some(i) = tri.v.iter().position(|&v| v == m) {
                let (x, y) = tri.edge(i);
                let opposite = edge_key(x, y);
                if self.subsegs.contains_key(&opposite) {
                    queue.push(opposite);
                }
            }
        }
        Ok(m)
    }

    fn replace(&mut self, (a, b): (usize, usize), m: usize, marker: i32, queue: &mut Vec<(usize, usize)>) {
        self.subsegs.remove(&(a, b));
        for half in [edge_key(a, m), edge_key(m, b)] {
            self.subsegs.insert(half, marker);
            queue.push(half);
        }
    }

    /// Make every subsegment an edge of the triangulation, unencroached when refining.
    fn recover(&mut self) -> Result<(), KernelError> {
        let mut queue: Vec<(usize, usize)> = self.subsegs.keys().rev().cloned().collect();
        while let Some(key) = queue.pop() {
            let Some(&marker) = self.subsegs.get(&key) else { continue };
            let (a, b) = key;
            let (pa, pb) = (self.tri.verts[a], self.tri.verts[b]);
            match self.tri.apexes(a, b) {
                Some(apexes) => {
                    let encroached = self.switches.refine
                        && apexes.iter().any(|&c| !Triangulation::is_super(c) && encroaches(&pa, &pb, &self.tri.verts[c]));
                    if encroached {
                        self.split(key, marker, &mut queue)?;
                    } else {
                        self.tri.constrain(a, b);
                    }
                }
                None => match self.vertex_on_segment(a, b) {
                    Some(c) => {
                        if self.markers[c] == 0 {
                            self.markers[c] = marker;
                        }
                        self.replace(key, c, marker, &mut queue);
                    }
                    None => {
                        self.split(key, marker, &mut queue)?;
                    }
                },
            }
        }
        Ok(())
    }

    fn flood(&mut self, seeds: Vec<usize>, tag: Region, can_enter: impl Fn(Region) -> bool) {
        let mut seen = vec![false; self.tri.tris.len()];
        let mut stack: Vec<usize> = seeds.into_iter().filter(|&t| can_enter(self.region[t])).collect();
        while let Some(t) = stack.pop() {
            if seen[t] {
                continue;
            }
            seen[t] = true;
            self.region[t] = tag;
            let tri = self.tri.tris[t];
            for i in 0..3 {
                let Some(nb) = tri.n[i] else { continue };
                let (a, b) = tri.edge(i);
                if !seen[nb] && !self.tri.is_constrained(a, b) && can_enter(self.region[nb]) {
                    stack.push(nb);
                }
            }
        }
    }

    fn classify(&mut self) {
        self.region = vec![Region::Unset; self.tri.tris.len()];
        let outer: Vec<usize> = self
            .tri
            .live()
            .filter(|&t| self.tri.tris[t].v.iter().any(|&v| Triangulation::is_super(v)))
            .collect();
        if !self.switches.pslg {
            for t in outer {
                self.region[t] = Region::Exterior;
            }
        } else {
            self.flood(outer, Region::Exterior, |r| r == Region::Unset);
            for hole in &self.input.holes {
                if let Some(t) = self.tri.locate(hole) {
                    self.flood(vec![t], Region::Hole, |r| matches!(r, Region::Unset | Region::Attribute(_)));
                }
            }
            for seed in &self.input.regions {
                if let Some(t) = self.tri.locate(&[seed.x, seed.y]) {
                    let tag = Region::Attribute(seed.attribute);
                    self.flood(vec![t], tag, |r| matches!(r, Region::Unset | Region::Attribute(_)));
                }
            }
        }
        for t in 0..self.region.len() {
            if self.tri.tris[t].alive && self.region[t] == Region::Unset {
                self.region[t] = Region::Attribute(0.);
            }
        }
    }

    fn refine(&mut self, unsuitable: UnsuitableFn) -> Result<(), KernelError> {
        let mut rounds = 0;
        loop {
            rounds += 1;
            let bad: Vec<(usize, [usize; 3])> = self
                .tri
                .live()
                .filter(|&t| self.region[t].in_domain())
                .filter(|&t| {
                    let [a, b, c] = self.tri.corners(t);
                    unsuitable(&a, &b, &c, orient2d(&a, &b, &c) / 2.)
                })
                .map(|t| (t, self.tri.tris[t].v))
                .collect();
            if bad.is_empty() {
                break;
            }
            let mut progress = false;
            let mut split_segment = false;
            for (t, v) in bad {
                if !self.tri.tris[t].alive || self.tri.tris[t].v != v {
                    continue;
                }
                let [a, b, c] = self.tri.corners(t);
                let Some(cc) = circumcenter(&a, &b, &c) else { continue };
                let encroached: Vec<((usize, usize), i32)> = self
                    .subsegs
                    .iter()
                    .filter(|((x, y), _)| encroaches(&self.tri.verts[*x], &self.tri.verts[*y], &cc))
                    .map(|(k, m)| (*k, *m))
                    .collect();
                if !encroached.is_empty() {
                    let mut queue = vec![];
                    for (key, marker) in encroached {
                        if self.subsegs.contains_key(&key) {
                            self.split(key, marker, &mut queue)?;
                        }
                    }
                    split_segment = true;
                    progress = true;
                    break;
                }
                let Some(home) = self.tri.locate(&cc) else { continue };
                let tag = self.region.get(home).copied().unwrap_or(Region::Unset);
                if !tag.in_domain() {
                    continue;
                }
                if self.tri.verts.len() >= self.max_points + SUPER {
                    return Err(KernelError::TooManyPoints(self.max_points));
                }
                match self.tri.insert(cc) {
                    Ok(_) => {
                        self.markers.push(0);
                        self.region.resize(self.tri.tris.len(), Region::Unset);
                        for &s in &self.tri.created {
                            self.region[s] = tag;
                        }
                        progress = true;
                    }
                    Err(err) => trace!("skipping circumcenter {:?}: {:?}", cc, err),
                }
            }
            if split_segment {
                self.recover()?;
                self.classify();
            }
            if !progress {
                break;
            }
        }
        debug!("refined in {} rounds to {} points", rounds, self.tri.verts.len() - SUPER);
        Ok(())
    }

    fn output(&self) -> KernelOutput {
        let keep: Vec<usize> = self.tri.live().filter(|&t| self.region[t].in_domain()).collect();
        let mut index = vec![-1i64; self.tri.tris.len()];
        for (k, &t) in keep.iter().enumerate() {
            index[t] = k as i64;
        }
        let mut out = KernelOutput {
            points: self.tri.verts[SUPER..].to_vec(),
            point_markers: self.markers[SUPER..].to_vec(),
            corners_per_triangle: 3,
            attributes_per_triangle: if self.switches.region_attributes { 1 } else { 0 },
            ..Default::default()
        };
        for &t in &keep {
            let tri = &self.tri.tris[t];
            out.triangles.extend(tri.v.iter().map(|v| v - SUPER));
            if let (true, Region::Attribute(attribute)) = (self.switches.region_attributes, self.region[t]) {
                out.triangle_attributes.push(attribute);
            }
            if self.switches.neighbors {
                out.neighbors.extend(tri.n.iter().map(|n| n.map_or(-1, |nb| index[nb])));
            }
        }
        out
    }
}
