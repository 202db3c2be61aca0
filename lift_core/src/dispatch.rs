//! Closest-call dispatch.

use std::collections::BTreeSet;

/// Pending floor closest to `current`; ties go to the lowest floor index.
///
/// `pending` iterates in ascending order and `min_by_key` keeps the first
/// of equal minima, which gives the lowest-index tie break.
pub fn next_floor(pending: &BTreeSet<usize>, current: usize) -> Option<usize> {
    pending
        .iter()
        .copied()
        .min_by_key(|&floor| floor.abs_diff(current))
}
