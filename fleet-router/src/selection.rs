//! Weighted round-robin backend selection (spec §4.2 "Selection
//! algorithm", §8 invariants 3 and 6, §9 "Selection-cursor
//! monotonicity").
//!
//! This deliberately does not depend on `rand`, unlike
//! `ultrafast-models-sdk/src/routing.rs`'s `select_weighted_provider`:
//! the spec pins ties to insertion order and forbids nondeterminism, so
//! selection is a pure function of the healthy set, the weights, and a
//! monotonic cursor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::pool::PoolMember;

/// Chooses the next backend from `healthy` (already filtered to healthy
/// members, in insertion order) using the monotonic cursor `c`. Returns
/// `None` only when `healthy` is empty. `c` is incremented exactly once
/// per call, regardless of which branch is taken.
pub fn select(healthy: &[Arc<PoolMember>], cursor: &AtomicU64) -> Option<Arc<PoolMember>> {
    if healthy.is_empty() {
        return None;
    }

    let total_weight: u64 = healthy.iter().map(|m| m.weight as u64).sum();
    let c = cursor.fetch_add(1, Ordering::Relaxed);

    if total_weight == 0 {
        return Some(healthy[(c as usize) % healthy.len()].clone());
    }

    let target = c % total_weight;
    let mut running = 0u64;
    for member in healthy {
        running += member.weight as u64;
        if running > target {
            return Some(member.clone());
        }
    }
    // Unreachable for a correctly summed total_weight, but keeps the
    // function total rather than panicking on a future refactor.
    healthy.last().cloned()
}
