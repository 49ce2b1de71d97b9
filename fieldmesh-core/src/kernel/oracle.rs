//! Size oracle for mesh refinement.
//!
//! The kernel's callback has no user-data channel, so the permitted edge
//! length lives in process-wide state. [`OracleScope`] owns that state for
//! the duration of one kernel call: it serializes concurrent meshers on a
//! lock and clears the threshold when dropped, on every exit path.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

static LOCK: Mutex<()> = Mutex::new(());

/// Squared longest permitted edge, as f64 bits. NaN (all ones) when no
/// scope is active, which makes every comparison false.
static MAX_EDGE_SQ: AtomicU64 = AtomicU64::new(u64::MAX);

pub struct OracleScope {
    _guard: MutexGuard<'static, ()>,
}

impl OracleScope {
    pub fn enter(longest_edge: f64) -> Self {
        let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        MAX_EDGE_SQ.store((longest_edge * longest_edge).to_bits(), Ordering::SeqCst);
        OracleScope { _guard: guard }
    }
}

impl Drop for OracleScope {
    fn drop(&mut self) {
        MAX_EDGE_SQ.store(u64::MAX, Ordering::SeqCst);
    }
}

fn dist2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// True if the longest edge of the triangle exceeds the active threshold.
pub fn triangle_unsuitable(v1: &[f64; 2], v2: &[f64; 2], v3: &[f64; 2], _area: f64) -> bool {
    let max_sq = f64::from_bits(MAX_EDGE_SQ.load(Ordering::SeqCst));
    let longest = dist2(v1, v2).max(dist2(v2, v3)).max(dist2(v3, v1));
    longest > max_sq
}
