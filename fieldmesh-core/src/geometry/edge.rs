//! Boundary edge classification.
//!
//! Every boundary vertex carries two (kind, distance) slots, since a vertex
//! can be the junction of two differently classified edges. An edge between
//! two consecutive vertices has the kind that both endpoints carry.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    #[default]
    Default,
    /// Numbered excitation port, numbers start at 1.
    Port(u32),
    /// Absorbing boundary.
    Abc,
}

impl EdgeKind {
    pub fn is_default(&self) -> bool {
        *self == EdgeKind::Default
    }
    pub fn port_number(&self) -> Option<u32> {
        match self {
            EdgeKind::Port(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub kind: [EdgeKind; 2],
    /// Position along the classified run of edges, 0 at its start and 1 at its end.
    pub dist: [f64; 2],
}

/// Classification of the edge between two vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedKind {
    pub kind: EdgeKind,
    pub dist1: f64,
    pub dist2: f64,
}

impl EdgeInfo {
    pub fn new(kind: EdgeKind, dist: f64) -> Self {
        EdgeInfo { kind: [kind, EdgeKind::Default], dist: [dist, 0.] }
    }

    pub fn is_default(&self) -> bool {
        self.kind.iter().all(EdgeKind::is_default)
    }

    pub fn slot(&self, kind: EdgeKind) -> Option<usize> {
        if kind.is_default() {
            return None;
        }
        self.kind.iter().position(|k| *k == kind)
    }

    pub fn has(&self, kind: EdgeKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Kind shared by this vertex and `other`, with each side's distance.
    ///
    /// The first kind in this vertex's slot order that `other` also carries
    /// wins. Vertices with nothing in common give [`EdgeKind::Default`].
    pub fn shared_kind(&self, other: &EdgeInfo) -> SharedKind {
        for (i, kind) in self.kind.iter().enumerate() {
            if let Some(j) = other.slot(*kind) {
                return SharedKind { kind: *kind, dist1: self.dist[i], dist2: other.dist[j] };
            }
        }
        if !self.is_default() && !other.is_default() {
            log::debug!("edge endpoints disagree on classification: {:?} vs {:?}", self.kind, other.kind);
        }
        SharedKind { kind: EdgeKind::Default, dist1: 0., dist2: 0. }
    }

    /// Record `kind` at distance `dist`, reusing its slot if present.
    /// Returns false if both slots hold other kinds.
    pub fn set(&mut self, kind: EdgeKind, dist: f64) -> bool {
        let slot = self.slot(kind).or_else(|| self.kind.iter().position(EdgeKind::is_default));
        match slot {
            Some(i) => {
                self.kind[i] = kind;
                self.dist[i] = dist;
                true
            }
            None => false,
        }
    }

    /// Whether [`EdgeInfo::set`] would succeed.
    pub fn can_take(&self, kind: EdgeKind) -> bool {
        self.has(kind) || self.kind.iter().any(EdgeKind::is_default)
    }

    pub fn remove(&mut self, kind: EdgeKind) {
        if let Some(i) = self.slot(kind) {
            self.kind[i] = EdgeKind::Default;
            self.dist[i] = 0.;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn shared() {
        let mut a = EdgeInfo::default();
        let mut b = EdgeInfo::default();
        assert_eq!(a.shared_kind(&b).kind, EdgeKind::Default);

        assert!(a.set(EdgeKind::Port(1), 0.));
        assert!(b.set(EdgeKind::Abc, 0.5));
        assert!(b.set(EdgeKind::Port(1), 1.));
        let s = a.shared_kind(&b);
        assert_eq!(s, SharedKind { kind: EdgeKind::Port(1), dist1: 0., dist2: 1. });

        // Both slots taken by other kinds.
        assert!(!b.can_take(EdgeKind::Port(2)));
        assert!(!b.set(EdgeKind::Port(2), 0.));
        assert!(b.can_take(EdgeKind::Abc));
    }

    #[test]
    fn disagreement_is_default() {
        let a = EdgeInfo::new(EdgeKind::Port(1), 0.);
        let b = EdgeInfo::new(EdgeKind::Port(2), 0.);
        assert_eq!(a.shared_kind(&b).kind, EdgeKind::Default);
        assert_eq!(b.shared_kind(&a).kind, EdgeKind::Default);
    }

    #[test]
    fn first_slot_wins() {
        let mut a = EdgeInfo::new(EdgeKind::Abc, 0.2);
        a.set(EdgeKind::Port(3), 0.4);
        let mut b = EdgeInfo::new(EdgeKind::Port(3), 0.6);
        b.set(EdgeKind::Abc, 0.8);
        let s = a.shared_kind(&b);
        assert_eq!(s.kind, EdgeKind::Abc);
        assert_eq!((s.dist1, s.dist2), (0.2, 0.8));
        assert_eq!(b.shared_kind(&a).kind, EdgeKind::Port(3));
    }

    #[test]
    fn remove() {
        let mut a = EdgeInfo::new(EdgeKind::Port(1), 0.);
        a.remove(EdgeKind::Port(1));
        assert!(a.is_default());
    }
}
