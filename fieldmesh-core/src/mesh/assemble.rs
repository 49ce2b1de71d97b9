//! Turning a [`Shape`] into triangulator input.
//!
//! Coincident boundary points of different pieces become one kernel point,
//! its unique point index (UPI). Kernel points carry marker `2 + UPI`,
//! segments carry `-1 - UPI` of their first endpoint, so kernel output can
//! be traced back to the shape.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use ordered_float::OrderedFloat;

use crate::{
    config::MeshConfig,
    error::MeshError,
    geometry::{
        polygon::{any_point_in_poly, winding_number},
        shape::Shape,
        vertex::{Origin, Vertex},
    },
    kernel::{KernelInput, RegionSeed},
    r2::R2,
};

type Key = (OrderedFloat<f64>, OrderedFloat<f64>);

fn key(p: &R2<f64>) -> Key {
    (OrderedFloat(p.x), OrderedFloat(p.y))
}

/// Unique points of a shape, keyed on exact coordinate values.
#[derive(Clone, Debug, Default)]
pub struct PointIndex {
    upis: BTreeMap<Key, usize>,
    /// Every (piece, vertex) at which each UPI occurs, in shape order.
    occurrences: Vec<Vec<Origin>>,
}

impl PointIndex {
    pub fn new(shape: &Shape) -> Self {
        let mut index = PointIndex::default();
        for (piece, p) in shape.pieces.iter().enumerate() {
            for (edge, vertex) in p.points.iter().enumerate() {
                let next = index.occurrences.len();
                let upi = *index.upis.entry(key(&vertex.v())).or_insert(next);
                if upi == next {
                    index.occurrences.push(vec![]);
                }
                index.occurrences[upi].push(Origin { piece, edge });
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn get(&self, p: &R2<f64>) -> Option<usize> {
        self.upis.get(&key(p)).cloned()
    }

    /// Where `upi` first appears; edge `first(upi).edge` starts at it.
    pub fn first(&self, upi: usize) -> Origin {
        self.occurrences[upi][0]
    }

    pub fn occurrences(&self, upi: usize) -> &[Origin] {
        &self.occurrences[upi]
    }
}

/// A point inside each true hole of the shape.
///
/// Painting can leave a negative-area piece that another material fills,
/// so holes are looked for in the merged outline.
pub fn find_holes(shape: &Shape) -> Result<Vec<[f64; 2]>, MeshError> {
    let merged = shape.merged();
    let mut holes = vec![];
    for (i, hole) in merged.pieces.iter().enumerate().filter(|(_, piece)| piece.is_hole()) {
        let ring: Vec<R2<f64>> = hole.points.iter().map(Vertex::v).collect();
        // Islands inside the hole must not catch the seed.
        let mut poly = hole.points.clone();
        for island in merged.pieces.iter().filter(|piece| !piece.is_hole()) {
            if let Some(first) = island.points.first() {
                if winding_number(&ring, &first.v()) != 0 {
                    poly.extend(island.points.iter().cloned());
                }
            }
        }
        let p = any_point_in_poly(&poly, Some(hole.points.len())).ok_or(MeshError::NoInteriorPoint(i))?;
        holes.push(p.arr());
    }
    Ok(holes)
}

/// Check `shape` and lay it out for the triangulator.
pub fn assemble(shape: &Shape, config: &MeshConfig) -> Result<(KernelInput, PointIndex), MeshError> {
    if let Some(err) = shape.geometry_error(true) {
        return Err(err.into());
    }
    if let Some(angle) = shape.sharpest_angle() {
        if angle.v() < config.sharpest_allowable_angle {
            return Err(MeshError::SharpAngle { angle: angle.v(), min: config.sharpest_allowable_angle });
        }
    }
    let holes = find_holes(shape)?;
    let index = PointIndex::new(shape);

    let points: Vec<[f64; 2]> = (0..index.len())
        .map(|upi| {
            let Origin { piece, edge } = index.first(upi);
            shape.piece(piece)[edge].v().arr()
        })
        .collect();
    let point_markers = (0..index.len()).map(|upi| 2 + upi as i32).collect();

    let mut seen = BTreeSet::new();
    let mut segments = vec![];
    let mut segment_markers = vec![];
    for piece in &shape.pieces {
        for (a, b) in piece.edges() {
            let (Some(a), Some(b)) = (index.get(&a.v()), index.get(&b.v())) else { continue };
            if a != b && seen.insert((a, b)) {
                segments.push([a, b]);
                segment_markers.push(-1 - a as i32);
            }
        }
    }

    let hole_points: Vec<Vertex> = shape
        .pieces
        .iter()
        .filter(|piece| piece.is_hole())
        .flat_map(|piece| piece.points.iter().cloned())
        .collect();
    let mut regions = vec![];
    for (i, piece) in shape.pieces.iter().enumerate().filter(|(_, piece)| !piece.is_hole()) {
        let mut poly = piece.points.clone();
        poly.extend(hole_points.iter().cloned());
        let p = any_point_in_poly(&poly, Some(piece.points.len())).ok_or(MeshError::NoInteriorPoint(i))?;
        regions.push(RegionSeed { x: p.x, y: p.y, attribute: i as f64, max_area: -1. });
    }

    debug!(
        "assembled {} points, {} segments, {} regions, {} holes",
        points.len(),
        segments.len(),
        regions.len(),
        holes.len()
    );
    let input = KernelInput { points, point_markers, segments, segment_markers, regions, holes };
    Ok((input, index))
}
