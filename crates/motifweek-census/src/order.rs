//! Canonical component order for motif vectors
//!
//! The census fills vectors in the order it discovers patterns. Published
//! vectors group directed dyads first (out, in, mutual; label 0 then 1), then
//! triads by number of label-1 neighbours with open before closed.

use super::census::MOTIF_LEN;
use ndarray::{Array1, Axis};

/// `CANONICAL_ORDER[c]` is the raw component placed at canonical position `c`
pub const CANONICAL_ORDER: [usize; MOTIF_LEN] = [2, 3, 4, 5, 0, 1, 6, 9, 7, 10, 8, 11];

/// Component names in canonical order
pub const CANONICAL_NAMES: [&str; MOTIF_LEN] = [
    "out_l0", "out_l1", "in_l0", "in_l1", "mutual_l0", "mutual_l1",
    "open_l0", "closed_l0", "open_l1", "closed_l1", "open_l2", "closed_l2",
];

/// Reorder a raw census vector into canonical order
pub fn canonical(raw: &Array1<f64>) -> Array1<f64> {
    raw.select(Axis(0), &CANONICAL_ORDER)
}
